//! DOM Node Operations
//!
//! Core node manipulation: appendChild, insertBefore, removeChild and the
//! attribute/style/class setters. Every mutation queues a record for the
//! interested mutation observers.

use crate::{DomTree, MutationRecord, NodeId};

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0} not found")]
    NotFound(NodeId),

    #[error("hierarchy request error: cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("node {0} has the wrong type for this operation")]
    InvalidNodeType(NodeId),

    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

impl DomTree {
    fn require(&self, id: NodeId) -> DomResult<()> {
        self.get(id).map(|_| ()).ok_or(DomError::NotFound(id))
    }

    /// Append a child node, moving it from its current parent if needed
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert a child as the first child of `parent`
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        let first = self.first_child(parent);
        self.insert_before(parent, child, first)
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.require(parent)?;
        self.require(child)?;

        if !self.nodes[parent.index()].can_have_children() {
            return Err(DomError::InvalidNodeType(parent));
        }
        if child == self.root() || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild { parent, child: reference });
            }
        }

        // Inserting before itself means inserting before its next sibling
        let reference = match reference {
            Some(r) if r == child => self.next_sibling(child),
            other => other,
        };

        self.unlink_and_notify(child);

        let prev = match reference {
            Some(r) => self.nodes[r.index()].prev_sibling,
            None => self.nodes[parent.index()].last_child,
        };
        let next = reference.unwrap_or(NodeId::NONE);
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }

        self.queue_record(MutationRecord::child_list(
            parent,
            vec![child],
            Vec::new(),
            prev.to_option(),
            next.to_option(),
        ));
        Ok(child)
    }

    /// Detach a node from wherever it is, returning its former parent
    pub fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        self.get(node)?;
        self.unlink_and_notify(node)
    }

    fn unlink_and_notify(&mut self, child: NodeId) -> Option<NodeId> {
        let (parent, prev, next) = {
            let node = &self.nodes[child.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return None;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        {
            let node = &mut self.nodes[child.index()];
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }

        self.queue_record(MutationRecord::child_list(
            parent,
            Vec::new(),
            vec![child],
            prev.to_option(),
            next.to_option(),
        ));
        Some(parent)
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        let elem = self
            .get_mut(node)
            .ok_or(DomError::NotFound(node))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(node))?;
        let old = elem.set_attr(name, value);
        self.queue_record(MutationRecord::attribute(node, name, old));
        Ok(())
    }

    /// Write one inline style property (`element.style[property] = value`)
    pub fn set_style_property(
        &mut self,
        node: NodeId,
        property: &str,
        value: &str,
    ) -> DomResult<Option<String>> {
        let elem = self
            .get_mut(node)
            .ok_or(DomError::NotFound(node))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(node))?;
        let old_text = elem.get_attr("style").map(str::to_string);
        let old = elem.set_style_property(property, value);
        self.queue_record(MutationRecord::attribute(node, "style", old_text));
        Ok(old)
    }

    /// `classList.add`
    pub fn add_class(&mut self, node: NodeId, class: &str) -> DomResult<bool> {
        self.edit_classes(node, |elem| elem.add_class(class))
    }

    /// `classList.remove`
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> DomResult<bool> {
        self.edit_classes(node, |elem| elem.remove_class(class))
    }

    fn edit_classes(
        &mut self,
        node: NodeId,
        edit: impl FnOnce(&mut crate::ElementData) -> bool,
    ) -> DomResult<bool> {
        let elem = self
            .get_mut(node)
            .ok_or(DomError::NotFound(node))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(node))?;
        let old = elem.get_attr("class").map(str::to_string);
        let changed = edit(elem);
        if changed {
            self.queue_record(MutationRecord::attribute(node, "class", old));
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MutationObserverInit;

    #[test]
    fn test_append_moves_between_parents() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div");
        let b = tree.create_element("div");
        let child = tree.create_element("p");
        tree.append_child(tree.root(), a).unwrap();
        tree.append_child(tree.root(), b).unwrap();
        tree.append_child(a, child).unwrap();

        tree.append_child(b, child).unwrap();
        assert_eq!(tree.parent(child), Some(b));
        assert_eq!(tree.first_child(a), None);
        assert_eq!(tree.children(b).collect::<Vec<_>>(), vec![child]);
    }

    #[test]
    fn test_prepend_inserts_at_front() {
        let mut tree = DomTree::new();
        let list = tree.create_element("ul");
        let items: Vec<_> = (0..3).map(|_| tree.create_element("li")).collect();
        for &item in &items {
            tree.append_child(list, item).unwrap();
        }

        tree.prepend_child(list, items[2]).unwrap();
        assert_eq!(
            tree.children(list).collect::<Vec<_>>(),
            vec![items[2], items[0], items[1]]
        );
        assert_eq!(tree.last_child(list), Some(items[1]));
        assert_eq!(tree.prev_sibling(items[0]), Some(items[2]));
    }

    #[test]
    fn test_hierarchy_errors() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        let text = tree.create_text("x");
        tree.append_child(outer, inner).unwrap();

        assert_eq!(
            tree.append_child(inner, outer),
            Err(DomError::HierarchyRequest { parent: inner, child: outer })
        );
        assert_eq!(tree.append_child(text, inner), Err(DomError::InvalidNodeType(text)));
        assert_eq!(
            tree.insert_before(inner, text, Some(outer)),
            Err(DomError::NotAChild { parent: inner, child: outer })
        );
        let missing = NodeId(999);
        assert_eq!(tree.append_child(outer, missing), Err(DomError::NotFound(missing)));
    }

    #[test]
    fn test_move_emits_remove_then_add() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div");
        let b = tree.create_element("div");
        let child = tree.create_element("p");
        tree.append_child(tree.root(), a).unwrap();
        tree.append_child(tree.root(), b).unwrap();
        tree.append_child(a, child).unwrap();

        let observer = tree.observe(tree.root(), MutationObserverInit::child_list_subtree());
        tree.append_child(b, child).unwrap();

        let records = tree.take_records(observer);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].target, a);
        assert_eq!(records[0].removed_nodes, vec![child]);
        assert_eq!(records[1].target, b);
        assert_eq!(records[1].added_nodes, vec![child]);
    }

    #[test]
    fn test_detached_mutations_not_observed() {
        let mut tree = DomTree::new();
        let observer = tree.observe(tree.root(), MutationObserverInit::child_list_subtree());
        let loose = tree.create_element("div");
        let child = tree.create_element("p");
        tree.append_child(loose, child).unwrap();
        assert!(tree.take_records(observer).is_empty());
    }

    #[test]
    fn test_style_and_class_setters() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let text = tree.create_text("t");

        tree.set_style_property(div, "display", "block").unwrap();
        assert_eq!(tree.style_property(div, "display").as_deref(), Some("block"));
        assert_eq!(
            tree.set_style_property(text, "display", "block"),
            Err(DomError::InvalidNodeType(text))
        );

        assert!(tree.add_class(div, "open").unwrap());
        assert!(!tree.add_class(div, "open").unwrap());
        assert!(tree.has_class(div, "open"));
        assert!(tree.remove_class(div, "open").unwrap());
        assert!(!tree.has_class(div, "open"));
    }
}
