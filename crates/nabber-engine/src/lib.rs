//! Recipe Nabber engine
//!
//! The content script proper. It finds the recipe card on a page, lifts it
//! into a full-screen overlay, and puts it back when the overlay closes.
//!
//! - [`matcher`]: live list of elements matching the recipe selectors
//! - [`relocator`]: moves matched subtrees into the overlay and back
//! - [`session`]: open/closed state and the re-entrancy guard
//! - [`metrics`]: settled word-count sample reported to the host
//! - [`ContentScript`]: ties them together and handles host triggers

pub mod config;
pub mod layout;
pub mod matcher;
pub mod messages;
pub mod metrics;
pub mod overlay;
pub mod relocator;
pub mod reporter;
pub mod resources;
pub mod session;
mod script;

pub use config::{Config, ConfigError, OverlayConfig};
pub use layout::{LayoutProbe, StaticLayout};
pub use matcher::{observe_matches, MatchSession};
pub use messages::{InboundMessage, OutboundMessage};
pub use metrics::MetricsSample;
pub use overlay::Overlay;
pub use relocator::{Relocator, RestoreReport};
pub use reporter::{ChannelReporter, LogReporter, ReportError, Reporter};
pub use resources::{BundledResources, DirectoryResources, ResourceError, ResourceResolver};
pub use script::{CloseOutcome, ContentScript, OpenOutcome, Trigger};
pub use session::{OverlayState, SessionState};

use nabber_dom::DomError;

/// Engine errors
///
/// A failed open leaves the page's own nodes under their parents: checks run
/// before the first host mutation, and later failures are rolled back.
#[derive(Debug, thiserror::Error)]
pub enum NabberError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("overlay markup has no element with id {0:?}")]
    MissingAnchor(String),

    #[error("document has no <{0}> element")]
    MissingHostElement(&'static str),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
