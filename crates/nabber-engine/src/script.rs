//! Content script
//!
//! Drives one host document: opens the recipe overlay on load, closes it on
//! a click on the close button, and reopens it when the host asks.
//!
//! The document is shared as `Rc<RefCell<Document>>`. Borrows are taken in
//! short synchronous sections and never held across an `.await`; every state
//! check happens inside such a section.

use std::cell::RefCell;
use std::rc::Rc;

use nabber_css::SelectorList;
use nabber_dom::{Document, NodeId};
use nabber_html::HtmlParser;
use smol::channel::Receiver;
use smol::{LocalExecutor, Timer};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::layout::{LayoutProbe, StaticLayout};
use crate::matcher::{observe_matches, MatchSession};
use crate::messages::InboundMessage;
use crate::metrics;
use crate::overlay::Overlay;
use crate::relocator::{Relocator, RestoreReport};
use crate::reporter::Reporter;
use crate::resources::ResourceResolver;
use crate::session::{OverlayState, SessionState};
use crate::NabberError;

/// Something the host asks the content script to do
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Page finished loading
    Load,
    Message(InboundMessage),
    /// JSON message as received from the host
    RawMessage(String),
    /// The user clicked a node
    Click(NodeId),
}

/// Result of an open attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened { relocated: usize },
    /// Nothing on the page matched; the document was not touched
    NoMatches,
    /// The overlay was already open or being opened
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed(RestoreReport),
    NotOpen,
}

#[derive(Debug, Default)]
struct ActiveSession {
    matches: Option<MatchSession>,
    relocator: Relocator,
    overlay: Option<Overlay>,
}

/// The content script for one document
pub struct ContentScript<R, P> {
    document: Rc<RefCell<Document>>,
    config: Config,
    patterns: SelectorList,
    resources: R,
    reporter: Rc<P>,
    layout: Box<dyn LayoutProbe>,
    executor: Rc<LocalExecutor<'static>>,
    state: SessionState,
    active: RefCell<ActiveSession>,
}

impl<R, P> ContentScript<R, P>
where
    R: ResourceResolver,
    P: Reporter + 'static,
{
    /// Create a script for `document`; fails if a configured selector is invalid
    pub fn new(
        document: Rc<RefCell<Document>>,
        config: Config,
        resources: R,
        reporter: P,
        executor: Rc<LocalExecutor<'static>>,
    ) -> Result<Self, NabberError> {
        let patterns = config.selector_list()?;
        Ok(Self {
            document,
            config,
            patterns,
            resources,
            reporter: Rc::new(reporter),
            layout: Box::new(StaticLayout::default()),
            executor,
            state: SessionState::new(),
            active: RefCell::new(ActiveSession::default()),
        })
    }

    /// Use real geometry for the scroll anchor
    pub fn with_layout(mut self, layout: impl LayoutProbe + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    pub fn document(&self) -> &Rc<RefCell<Document>> {
        &self.document
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> OverlayState {
        self.state.state()
    }

    /// An open has started and not yet finished
    pub fn is_opening(&self) -> bool {
        self.state.is_opening()
    }

    /// The most recently built overlay, shown or hidden
    pub fn overlay(&self) -> Option<Overlay> {
        self.active.borrow().overlay
    }

    /// Current match list of the active session
    pub fn matches(&self) -> Vec<NodeId> {
        self.sync();
        self.active
            .borrow()
            .matches
            .as_ref()
            .map(|session| session.matches().to_vec())
            .unwrap_or_default()
    }

    /// Parent a node was moved away from, while it sits in the overlay
    pub fn original_parent(&self, node: NodeId) -> Option<NodeId> {
        self.active.borrow().relocator.original_parent(node)
    }

    /// Deliver pending mutation records to the active session
    pub fn sync(&self) -> usize {
        let mut doc = self.document.borrow_mut();
        match self.active.borrow_mut().matches.as_mut() {
            Some(session) => session.sync(&mut doc.tree),
            None => 0,
        }
    }

    /// Open the overlay: `Closed -> Open`
    pub async fn open(&self) -> Result<OpenOutcome, NabberError> {
        let Some(guard) = self.state.try_begin_open() else {
            debug!("open suppressed: overlay open or opening");
            return Ok(OpenOutcome::Suppressed);
        };

        let (mut session, anchor_offset) = {
            let mut doc = self.document.borrow_mut();
            let root = doc.tree.root();
            let mut session = observe_matches(&mut doc.tree, root, &self.patterns);
            let Some(first) = session.first() else {
                session.disconnect(&mut doc.tree);
                debug!("no recipe elements on page");
                return Ok(OpenOutcome::NoMatches);
            };
            (session, self.layout.document_top(&doc.tree, first))
        };

        let markup = match self
            .resources
            .fetch_text(&self.config.overlay.markup_resource)
            .await
        {
            Ok(markup) => markup,
            Err(err) => {
                session.disconnect(&mut self.document.borrow_mut().tree);
                return Err(err.into());
            }
        };
        let template = HtmlParser::new().parse(&markup);

        let mut doc = self.document.borrow_mut();
        let (overlay, relocator) = match self.install(&mut doc, &mut session, &template) {
            Ok(Some(installed)) => installed,
            Ok(None) => {
                session.disconnect(&mut doc.tree);
                debug!("no recipe element could be moved");
                return Ok(OpenOutcome::NoMatches);
            }
            Err(err) => {
                session.disconnect(&mut doc.tree);
                return Err(err);
            }
        };
        let relocated = relocator.len();
        {
            let mut active = self.active.borrow_mut();
            if let Some(mut superseded) = active.matches.replace(session) {
                superseded.disconnect(&mut doc.tree);
            }
            active.relocator = relocator;
            active.overlay = Some(overlay);
        }
        drop(doc);
        guard.commit();

        metrics::schedule_sample(
            &self.executor,
            self.document.clone(),
            overlay.modal,
            anchor_offset,
            self.config.settle_delay(),
            self.reporter.clone(),
        )
        .detach();
        info!(relocated, "recipe overlay shown");
        Ok(OpenOutcome::Opened { relocated })
    }

    /// Build the overlay and move the matches into it
    ///
    /// Returns `None` when no match could be moved, in which case the page
    /// is untouched. If a step after relocation fails, the moved nodes go
    /// back to their parents and the new overlay is taken out again before
    /// the error is returned.
    fn install(
        &self,
        doc: &mut Document,
        session: &mut MatchSession,
        template: &Document,
    ) -> Result<Option<(Overlay, Relocator)>, NabberError> {
        let body = doc.body().ok_or(NabberError::MissingHostElement("body"))?;
        let overlay = Overlay::build(&mut doc.tree, template, &self.config.overlay)?;

        // Pick up anything inserted while the markup was loading
        session.sync(&mut doc.tree);

        let mut relocator = Relocator::new().keeping(body);
        if relocator.relocate(&mut doc.tree, session.matches(), overlay.content) == 0 {
            return Ok(None);
        }
        if let Err(err) = self.decorate(doc, body, &overlay) {
            let report = relocator.restore(&mut doc.tree, session.matches());
            overlay.remove(&mut doc.tree);
            if let Err(unmark) = doc.tree.remove_class(body, &self.config.overlay.active_class) {
                warn!("cannot unmark body: {unmark}");
            }
            warn!(restored = report.restored, "overlay setup failed, page restored: {err}");
            return Err(err);
        }

        if let Some(stale) = self.active.borrow_mut().overlay.take() {
            debug!(modal = %stale.modal, "removing stale overlay");
            stale.remove(&mut doc.tree);
        }
        Ok(Some((overlay, relocator)))
    }

    /// Show the overlay and mark the page as taken over
    fn decorate(&self, doc: &mut Document, body: NodeId, overlay: &Overlay) -> Result<(), NabberError> {
        overlay.attach(doc)?;
        self.link_stylesheet(doc);
        doc.tree.add_class(body, &self.config.overlay.active_class)?;
        overlay.match_close_button_color(&mut doc.tree)?;
        if let Some(html) = doc.document_element() {
            doc.tree.set_style_property(html, "height", "100vh")?;
        }
        Ok(())
    }

    /// Append the card stylesheet to `<head>` unless it is already linked
    fn link_stylesheet(&self, doc: &mut Document) {
        let Some(head) = doc.head() else {
            warn!("document has no <head>, overlay stylesheet not linked");
            return;
        };
        let href = match self.resources.url_for(&self.config.overlay.stylesheet_resource) {
            Ok(href) => href,
            Err(err) => {
                warn!("overlay stylesheet not linked: {err}");
                return;
            }
        };
        let tree = &doc.tree;
        let linked = tree.children(head).any(|node| {
            tree.local_name(node) == Some("link") && tree.get_attribute(node, "href") == Some(href.as_str())
        });
        if linked {
            return;
        }
        let link = doc.tree.create_element_with_attrs(
            "link",
            &[("rel", "stylesheet"), ("type", "text/css"), ("href", href.as_str())],
        );
        if let Err(err) = doc.tree.append_child(head, link) {
            warn!("cannot link overlay stylesheet: {err}");
        }
    }

    /// Close the overlay: `Open -> Closed`
    ///
    /// Nodes go back first, then the overlay is hidden.
    pub fn close(&self) -> CloseOutcome {
        if !self.state.is_open() {
            debug!("close ignored: overlay not open");
            return CloseOutcome::NotOpen;
        }

        let mut doc = self.document.borrow_mut();
        let mut active = self.active.borrow_mut();
        let active = &mut *active;
        let matches = match active.matches.as_mut() {
            Some(session) => {
                session.sync(&mut doc.tree);
                session.matches().to_vec()
            }
            None => Vec::new(),
        };
        let report = active.relocator.restore(&mut doc.tree, &matches);

        if let Some(overlay) = active.overlay {
            if let Err(err) = overlay.hide(&mut doc.tree) {
                warn!("cannot hide overlay: {err}");
            }
        }
        if let Some(body) = doc.body() {
            if let Err(err) = doc.tree.remove_class(body, &self.config.overlay.active_class) {
                warn!("cannot unmark body: {err}");
            }
        }

        self.state.close();
        info!(restored = report.restored, skipped = report.skipped, "recipe overlay hidden");
        CloseOutcome::Closed(report)
    }

    /// Reopen on request from the host
    ///
    /// Waits the configured deferral first; an overlay that is open by then
    /// is left alone.
    pub async fn reload(&self) -> Result<OpenOutcome, NabberError> {
        Timer::after(self.config.reopen_delay()).await;
        self.open().await
    }

    fn is_close_target(&self, target: NodeId) -> bool {
        let Some(overlay) = self.active.borrow().overlay else {
            return false;
        };
        overlay.is_close_target(&self.document.borrow().tree, target)
    }

    /// React to one trigger
    pub async fn handle(&self, trigger: Trigger) -> Result<(), NabberError> {
        match trigger {
            Trigger::Load => {
                self.open().await?;
            }
            Trigger::Message(message) => self.handle_message(message).await?,
            Trigger::RawMessage(json) => match InboundMessage::from_json(&json) {
                Ok(message) => self.handle_message(message).await?,
                Err(err) => debug!("ignoring malformed message: {err}"),
            },
            Trigger::Click(target) => {
                if self.is_close_target(target) {
                    self.close();
                }
            }
        }
        Ok(())
    }

    async fn handle_message(&self, message: InboundMessage) -> Result<(), NabberError> {
        match message {
            InboundMessage::DidSelectReloadCell => {
                self.reload().await?;
            }
            InboundMessage::Unknown => debug!("ignoring unknown message"),
        }
        Ok(())
    }

    /// Open once, then serve triggers until the channel closes
    pub async fn run(&self, triggers: Receiver<Trigger>) {
        if let Err(err) = self.open().await {
            warn!("initial open failed: {err}");
        }
        while let Ok(trigger) = triggers.recv().await {
            self.sync();
            if let Err(err) = self.handle(trigger).await {
                warn!("trigger failed: {err}");
            }
        }
        debug!("trigger channel closed");
    }
}

impl<R, P> Drop for ContentScript<R, P> {
    fn drop(&mut self) {
        let Some(session) = self.active.get_mut().matches.as_mut() else {
            return;
        };
        if let Ok(mut doc) = self.document.try_borrow_mut() {
            session.disconnect(&mut doc.tree);
        }
    }
}
