//! Document - High-level document API

use crate::{DomResult, DomTree, NodeId};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a document with an empty html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");
        let root = tree.root();
        tree.link_last(root, html);
        tree.link_last(html, head);
        tree.link_last(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Wrap an already-built tree, locating html/head/body
    pub fn from_tree(tree: DomTree, url: &str) -> Self {
        let mut document = Self {
            tree,
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        };
        document.finalize();
        document
    }

    /// Refresh the cached html/head/body references
    pub fn finalize(&mut self) {
        let root = self.tree.root();
        self.html_element = self
            .tree
            .children(root)
            .find(|&n| self.tree.local_name(n) == Some("html"))
            .unwrap_or(NodeId::NONE);

        let html = self.html_element;
        let find_child = |tag: &str| {
            html.to_option()
                .and_then(|h| self.tree.children(h).find(|&n| self.tree.local_name(n) == Some(tag)))
                .unwrap_or(NodeId::NONE)
        };
        self.head_element = find_child("head");
        self.body_element = find_child("body");
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `document.domain`: host of the URL, empty for hostless URLs
    pub fn domain(&self) -> String {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default()
    }

    /// Get document title
    pub fn title(&self) -> String {
        let Some(head) = self.head() else {
            return String::new();
        };
        self.tree
            .children(head)
            .find(|&n| self.tree.local_name(n) == Some("title"))
            .map(|title| self.tree.text_content(title).trim().to_string())
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> Option<NodeId> {
        self.html_element.to_option()
    }

    /// Get <head> element
    pub fn head(&self) -> Option<NodeId> {
        self.head_element.to_option()
    }

    /// Get <body> element
    pub fn body(&self) -> Option<NodeId> {
        self.body_element.to_option()
    }

    /// Get the first connected element with the given id
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.find_by_id(self.tree.root(), id)
    }

    /// Connected elements with the given class
    pub fn get_elements_by_class_name(&self, class: &str) -> Vec<NodeId> {
        self.tree.elements_by_class_name(self.tree.root(), class)
    }

    /// Append a node under <body>
    pub fn append_to_body(&mut self, node: NodeId) -> DomResult<NodeId> {
        let body = self.body_element;
        self.tree.append_child(body, node)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
