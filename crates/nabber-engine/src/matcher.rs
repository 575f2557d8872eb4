//! Live matcher
//!
//! Keeps a list of elements matching the recipe selectors that stays current
//! as the page inserts content. The list starts from a document-order query
//! and afterwards only grows: each inserted node reported by the tree's
//! mutation observer is tested once, and appended if it matches.

use nabber_css::SelectorList;
use nabber_dom::{DomTree, MutationObserverInit, NodeId, ObserverId};
use tracing::{debug, trace};

/// One observation session over a subtree
#[derive(Debug)]
pub struct MatchSession {
    root: NodeId,
    patterns: SelectorList,
    matches: Vec<NodeId>,
    observer: Option<ObserverId>,
}

/// Query `root` for matches and start watching it for insertions
pub fn observe_matches(tree: &mut DomTree, root: NodeId, patterns: &SelectorList) -> MatchSession {
    let matches = nabber_css::query_selector_all(tree, root, patterns);
    let observer = tree.observe(root, MutationObserverInit::child_list_subtree());
    debug!(initial = matches.len(), %root, "match session started");
    MatchSession {
        root,
        patterns: patterns.clone(),
        matches,
        observer: Some(observer),
    }
}

impl MatchSession {
    /// Deliver pending insertion records, returning how many nodes were appended
    ///
    /// Only the inserted nodes themselves are tested, never their descendants.
    pub fn sync(&mut self, tree: &mut DomTree) -> usize {
        let Some(observer) = self.observer else {
            return 0;
        };
        let before = self.matches.len();
        for record in tree.take_records(observer) {
            for node in record.added_nodes {
                if tree.is_element(node) && self.patterns.matches(tree, node) {
                    trace!(%node, "late match");
                    self.matches.push(node);
                }
            }
        }
        self.matches.len() - before
    }

    /// Stop observing; calling it again does nothing
    pub fn disconnect(&mut self, tree: &mut DomTree) {
        if let Some(observer) = self.observer.take() {
            tree.disconnect(observer);
            debug!(matches = self.matches.len(), "match session disconnected");
        }
    }

    pub fn matches(&self) -> &[NodeId] {
        &self.matches
    }

    pub fn first(&self) -> Option<NodeId> {
        self.matches.first().copied()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn patterns(&self) -> &SelectorList {
        &self.patterns
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }
}
