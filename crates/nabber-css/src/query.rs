//! Element queries: `querySelector`, `querySelectorAll`, `matches`

use crate::SelectorList;
use nabber_dom::{DomTree, NodeId};
use tracing::trace;

/// All elements under `root` (excluding `root`) matched by `selectors`, in
/// document order
pub fn query_selector_all(tree: &DomTree, root: NodeId, selectors: &SelectorList) -> Vec<NodeId> {
    let found: Vec<NodeId> = tree
        .descendants(root)
        .filter(|&node| selectors.matches(tree, node))
        .collect();
    trace!(%root, selectors = selectors.len(), found = found.len(), "querySelectorAll");
    found
}

/// First element under `root` matched by `selectors`
pub fn query_selector(tree: &DomTree, root: NodeId, selectors: &SelectorList) -> Option<NodeId> {
    tree.descendants(root).find(|&node| selectors.matches(tree, node))
}

/// `Element.matches`: false for non-element nodes
pub fn matches(tree: &DomTree, node: NodeId, selectors: &SelectorList) -> bool {
    selectors.matches(tree, node)
}
