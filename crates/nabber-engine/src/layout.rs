//! Layout queries
//!
//! The engine never lays pages out itself; geometry comes from whoever hosts
//! the document.

use std::collections::HashMap;

use nabber_dom::{DOMRect, DomTree, NodeId};

/// Source of viewport geometry
pub trait LayoutProbe {
    /// Vertical scroll offset of the viewport
    fn scroll_top(&self) -> f64;

    /// Viewport-relative bounding box of a node
    fn bounding_client_rect(&self, tree: &DomTree, node: NodeId) -> DOMRect;

    /// Document-relative top edge of a node
    fn document_top(&self, tree: &DomTree, node: NodeId) -> f64 {
        self.bounding_client_rect(tree, node)
            .to_document(0.0, self.scroll_top())
            .top()
    }
}

/// Fixed geometry, for headless runs
///
/// Unknown nodes report an empty rect at the origin.
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    scroll_top: f64,
    rects: HashMap<NodeId, DOMRect>,
}

impl StaticLayout {
    pub fn new(scroll_top: f64) -> Self {
        Self {
            scroll_top,
            rects: HashMap::new(),
        }
    }

    pub fn with_rect(mut self, node: NodeId, rect: DOMRect) -> Self {
        self.rects.insert(node, rect);
        self
    }
}

impl LayoutProbe for StaticLayout {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn bounding_client_rect(&self, _tree: &DomTree, node: NodeId) -> DOMRect {
        self.rects.get(&node).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_top_adds_scroll() {
        let mut tree = DomTree::new();
        let card = tree.create_element("div");
        let layout =
            StaticLayout::new(250.0).with_rect(card, DOMRect::from_xywh(0.0, 40.0, 300.0, 900.0));
        assert_eq!(layout.document_top(&tree, card), 290.0);

        let other = tree.create_element("div");
        assert_eq!(layout.document_top(&tree, other), 250.0);
    }
}
