//! DOM Tree (arena-based allocation)

use crate::observer::ObserverRegistry;
use crate::{ElementData, MutationObserverInit, MutationRecord, Node, NodeId, ObserverId};

/// Elements whose text never reaches `innerText`
const NON_RENDERED: &[&str] = &["script", "style", "noscript", "template"];

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) observers: ObserverRegistry,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            observers: ObserverRegistry::default(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    ///
    /// Link fields must not be edited through this; use the tree operations.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true: the document node always exists
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(Node::element(name))
    }

    /// Create a detached element with attributes
    pub fn create_element_with_attrs(&mut self, name: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut node = Node::element(name);
        if let Some(elem) = node.as_element_mut() {
            for (k, v) in attrs {
                elem.set_attr(k, v);
            }
        }
        self.push(node)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text))
    }

    /// Create a detached DOCTYPE
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node::doctype(name))
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.to_option()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.first_child.to_option()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.last_child.to_option()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.next_sibling.to_option()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.prev_sibling.to_option()
    }

    /// Iterate direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    /// Iterate all descendants of `id` in document order (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// True if `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        contains(&self.nodes, ancestor, node)
    }

    /// True if the node is attached under the document node
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.root(), node)
    }

    /// Element data of a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    /// Tag name of an element node
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::local_name)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attr(name)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    /// Inline style property of an element
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        self.element(id)?.style_property(property)
    }

    /// First element with the given id under `root`, in document order
    pub fn find_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|&n| self.element(n).and_then(ElementData::id) == Some(id))
    }

    /// Elements under `root` (excluding it) carrying `class`, in document order
    pub fn elements_by_class_name(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&n| self.has_class(n, class))
            .collect()
    }

    /// Elements under `root` (excluding it) with the given tag name
    pub fn elements_by_tag_name(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&n| self.local_name(n).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|n| self.get(n).and_then(Node::as_text))
            .collect()
    }

    /// Whitespace-separated words of rendered text under `id`.
    ///
    /// Approximates `innerText.split(" ")`: text inside script-like elements
    /// is skipped and each text node is counted separately.
    pub fn word_count(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else { continue };
            if let Some(text) = node.as_text() {
                count += text.split_whitespace().count();
                continue;
            }
            if let Some(elem) = node.as_element() {
                if NON_RENDERED.contains(&elem.local_name()) {
                    continue;
                }
            }
            stack.extend(self.children(current));
        }
        count
    }

    /// Deep-copy a subtree from another tree into this one. The copy is
    /// detached; no mutation records are queued.
    pub fn import_subtree(&mut self, source: &DomTree, source_root: NodeId) -> Option<NodeId> {
        let root_copy = self.push(source.get(source_root)?.detached_copy());
        let mut stack = vec![(source_root, root_copy)];
        while let Some((src, dst)) = stack.pop() {
            for child in source.children(src) {
                let Some(node) = source.get(child) else { continue };
                let copy = self.push(node.detached_copy());
                self.link_last(dst, copy);
                stack.push((child, copy));
            }
        }
        Some(root_copy)
    }

    /// Register a mutation observer on `target`
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        tracing::trace!(%target, "observer registered");
        self.observers.observe(target, options)
    }

    /// Stop an observer and drop its queued records
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.observers.disconnect(id)
    }

    /// Drain an observer's pending records
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers.take_records(id)
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn queue_record(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        let nodes = &self.nodes;
        self.observers.queue(record, |a, b| contains(nodes, a, b));
    }

    /// Append `child` (assumed detached) under `parent` without notifying
    pub(crate) fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

fn contains(nodes: &[Node], ancestor: NodeId, node: NodeId) -> bool {
    let mut current = node;
    while current.is_valid() {
        if current == ancestor {
            return true;
        }
        current = match nodes.get(current.index()) {
            Some(n) => n.parent,
            None => return false,
        };
    }
    false
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

/// Pre-order iterator over descendants, driven by sibling links so it needs
/// no stack regardless of depth
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        let (tree, root) = (self.tree, self.root);
        self.next = tree.first_child(current).or_else(|| {
            let mut node = current;
            loop {
                if node == root {
                    return None;
                }
                if let Some(sibling) = tree.next_sibling(node) {
                    return Some(sibling);
                }
                node = tree.parent(node)?;
            }
        });
        Some(current)
    }
}
