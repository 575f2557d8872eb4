//! Subtree relocator
//!
//! Moves matched subtrees into the overlay and back. The original parent of
//! every moved node is kept in a side table keyed by node, so nothing is
//! written onto the host's elements except the inline styles that make the
//! card lay out inside the overlay.

use std::collections::HashMap;

use nabber_dom::{DomTree, NodeId};
use tracing::{debug, warn};

/// Outcome of [`Relocator::restore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Nodes put back under their original parent
    pub restored: usize,
    /// Nodes whose original parent is no longer in the document
    pub skipped: usize,
    /// Nodes that were never relocated (late matches, duplicates)
    pub unrecorded: usize,
}

/// Records where relocated nodes came from
#[derive(Debug, Default)]
pub struct Relocator {
    records: HashMap<NodeId, NodeId>,
    pinned: Vec<NodeId>,
}

impl Relocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never move `node` or anything containing it
    pub fn keeping(mut self, node: NodeId) -> Self {
        self.pinned.push(node);
        self
    }

    /// Append each node to `destination`, in order, remembering its parent
    ///
    /// A node that is already recorded, has no parent, or contains the
    /// destination or a pinned node is left alone. Returns the number of
    /// nodes moved.
    pub fn relocate(&mut self, tree: &mut DomTree, matches: &[NodeId], destination: NodeId) -> usize {
        let mut moved = 0;
        for &node in matches {
            if self.records.contains_key(&node) {
                debug!(%node, "already relocated");
                continue;
            }
            let Some(parent) = tree.parent(node) else {
                warn!(%node, "matched node has no parent, not relocating");
                continue;
            };
            if tree.contains(node, destination) {
                warn!(%node, "destination lies inside matched node, not relocating");
                continue;
            }
            if let Some(&pinned) = self.pinned.iter().find(|&&p| tree.contains(node, p)) {
                warn!(%node, %pinned, "matched node holds a pinned node, not relocating");
                continue;
            }
            if let Err(err) = tree.set_style_property(node, "display", "block") {
                warn!(%node, "cannot style matched node: {err}");
                continue;
            }
            normalize_positioning(tree, node);

            match tree.append_child(destination, node) {
                Ok(_) => {
                    self.records.insert(node, parent);
                    moved += 1;
                }
                Err(err) => warn!(%node, "relocation failed: {err}"),
            }
        }
        debug!(moved, requested = matches.len(), "relocated");
        moved
    }

    /// Put relocated nodes back as the first child of their original parent
    ///
    /// Sibling order among restored nodes is not reconstructed.
    pub fn restore(&mut self, tree: &mut DomTree, matches: &[NodeId]) -> RestoreReport {
        let mut report = RestoreReport::default();
        for &node in matches {
            let Some(&parent) = self.records.get(&node) else {
                report.unrecorded += 1;
                continue;
            };
            if !tree.is_connected(parent) {
                warn!(%node, %parent, "original parent left the document, leaving node in overlay");
                report.skipped += 1;
                continue;
            }
            match tree.prepend_child(parent, node) {
                Ok(_) => {
                    self.records.remove(&node);
                    report.restored += 1;
                }
                Err(err) => {
                    warn!(%node, %parent, "restore failed: {err}");
                    report.skipped += 1;
                }
            }
        }
        debug!(?report, "restored");
        report
    }

    /// Parent a relocated node was taken from
    pub fn original_parent(&self, node: NodeId) -> Option<NodeId> {
        self.records.get(&node).copied()
    }

    /// Number of nodes currently away from their original parent
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Give every element below `node` `position: relative` so absolutely
/// positioned page furniture stays inside the card
fn normalize_positioning(tree: &mut DomTree, node: NodeId) {
    let mut stack: Vec<NodeId> = tree.children(node).collect();
    while let Some(current) = stack.pop() {
        if !tree.is_element(current) {
            continue;
        }
        if let Err(err) = tree.set_style_property(current, "position", "relative") {
            warn!(node = %current, "cannot normalize position: {err}");
        }
        stack.extend(tree.children(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nabber_dom::Document;

    struct Fixture {
        doc: Document,
        article: NodeId,
        sidebar: NodeId,
        card: NodeId,
        widget: NodeId,
        overlay: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new("https://example.com/");
        let body = doc.body().unwrap();
        let tree = &mut doc.tree;
        let article = tree.create_element("article");
        let sidebar = tree.create_element("aside");
        let card = tree.create_element_with_attrs("div", &[("class", "recipe-content")]);
        let heading = tree.create_element("h2");
        let text = tree.create_text("Soup");
        let list = tree.create_element("ul");
        let item = tree.create_element("li");
        let widget = tree.create_element_with_attrs("div", &[("class", "recipe-body")]);
        tree.append_child(body, article).unwrap();
        tree.append_child(body, sidebar).unwrap();
        tree.append_child(article, card).unwrap();
        tree.append_child(card, heading).unwrap();
        tree.append_child(heading, text).unwrap();
        tree.append_child(card, list).unwrap();
        tree.append_child(list, item).unwrap();
        tree.append_child(sidebar, widget).unwrap();
        let overlay = tree.create_element("div");
        tree.append_child(body, overlay).unwrap();
        Fixture { doc, article, sidebar, card, widget, overlay }
    }

    #[test]
    fn test_relocate_appends_in_order_and_styles() {
        let mut f = fixture();
        let mut relocator = Relocator::new();
        let moved = relocator.relocate(&mut f.doc.tree, &[f.card, f.widget], f.overlay);

        assert_eq!(moved, 2);
        assert_eq!(f.doc.tree.children(f.overlay).collect::<Vec<_>>(), vec![f.card, f.widget]);
        assert_eq!(relocator.original_parent(f.card), Some(f.article));
        assert_eq!(relocator.original_parent(f.widget), Some(f.sidebar));
        assert_eq!(f.doc.tree.style_property(f.card, "display").as_deref(), Some("block"));
        // The matched node itself keeps its own positioning
        assert_eq!(f.doc.tree.style_property(f.card, "position"), None);
        for node in f.doc.tree.descendants(f.card).filter(|&n| f.doc.tree.is_element(n)) {
            assert_eq!(
                f.doc.tree.style_property(node, "position").as_deref(),
                Some("relative")
            );
        }
    }

    #[test]
    fn test_relocate_rejects_duplicates_and_orphans() {
        let mut f = fixture();
        let orphan = f.doc.tree.create_element("div");
        let mut relocator = Relocator::new();
        let moved = relocator.relocate(&mut f.doc.tree, &[f.card, f.card, orphan], f.overlay);

        assert_eq!(moved, 1);
        assert_eq!(relocator.len(), 1);
        assert_eq!(relocator.original_parent(f.card), Some(f.article));
        assert_eq!(f.doc.tree.parent(orphan), None);
    }

    #[test]
    fn test_restore_returns_nodes_as_first_child() {
        let mut f = fixture();
        let first = f.doc.tree.create_element("p");
        f.doc.tree.prepend_child(f.article, first).unwrap();

        let mut relocator = Relocator::new();
        relocator.relocate(&mut f.doc.tree, &[f.card, f.widget], f.overlay);
        let report = relocator.restore(&mut f.doc.tree, &[f.card, f.widget]);

        assert_eq!(report, RestoreReport { restored: 2, skipped: 0, unrecorded: 0 });
        assert_eq!(f.doc.tree.first_child(f.article), Some(f.card));
        assert_eq!(f.doc.tree.next_sibling(f.card), Some(first));
        assert_eq!(f.doc.tree.first_child(f.sidebar), Some(f.widget));
        assert_eq!(f.doc.tree.first_child(f.overlay), None);
        assert!(relocator.is_empty());
    }

    #[test]
    fn test_restore_skips_missing_parent() {
        let mut f = fixture();
        let mut relocator = Relocator::new();
        relocator.relocate(&mut f.doc.tree, &[f.card, f.widget], f.overlay);
        f.doc.tree.detach(f.sidebar);

        let late = f.doc.tree.create_element("div");
        let report = relocator.restore(&mut f.doc.tree, &[f.card, f.widget, late]);
        assert_eq!(report, RestoreReport { restored: 1, skipped: 1, unrecorded: 1 });
        assert_eq!(f.doc.tree.parent(f.widget), Some(f.overlay));
        assert_eq!(relocator.original_parent(f.widget), Some(f.sidebar));
    }

    #[test]
    fn test_keeping_skips_pinned_ancestors() {
        let mut f = fixture();
        let body = f.doc.body().unwrap();
        let html = f.doc.document_element().unwrap();
        // Detached like a freshly built overlay, so only the pin protects body
        let content = f.doc.tree.create_element("div");
        let mut relocator = Relocator::new().keeping(body);
        let moved = relocator.relocate(&mut f.doc.tree, &[html, body, f.card], content);

        assert_eq!(moved, 1);
        assert_eq!(relocator.original_parent(body), None);
        assert_eq!(relocator.original_parent(html), None);
        assert!(f.doc.tree.is_connected(body));
        assert_eq!(f.doc.tree.style_property(body, "display"), None);
        assert_eq!(f.doc.tree.parent(f.card), Some(content));
    }

    #[test]
    fn test_nested_matches_restore_in_order() {
        let mut f = fixture();
        let inner = f.doc.tree.first_child(f.card).unwrap();
        let mut relocator = Relocator::new();
        relocator.relocate(&mut f.doc.tree, &[f.card, inner], f.overlay);
        assert_eq!(f.doc.tree.children(f.overlay).collect::<Vec<_>>(), vec![f.card, inner]);

        let report = relocator.restore(&mut f.doc.tree, &[f.card, inner]);
        assert_eq!(report.restored, 2);
        assert_eq!(f.doc.tree.parent(f.card), Some(f.article));
        assert_eq!(f.doc.tree.parent(inner), Some(f.card));
    }
}
