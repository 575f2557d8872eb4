//! Nabber DOM - Document Object Model
//!
//! Arena-based DOM tree used by the Recipe Nabber content script. Nodes are
//! addressed by [`NodeId`] and never move in memory; reparenting only rewires
//! the parent/sibling links, which keeps handles stable across relocation.

mod node;
mod tree;
mod operations;
mod document;
mod style;
mod observer;
mod geometry;
mod serialize;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Children, Descendants};
pub use operations::{DomError, DomResult};
pub use document::Document;
pub use style::StyleDeclaration;
pub use observer::{MutationObserverInit, MutationRecord, MutationType, ObserverId};
pub use geometry::DOMRect;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this is not the `NONE` sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Convert the sentinel into an `Option`
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#none")
        }
    }
}
