//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the arena DOM. This is simpler
//! and more reliable than implementing TreeSink directly.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use nabber_dom::{Document, DomTree, NodeId};

/// HTML5 parser
pub struct HtmlParser {
    keep_whitespace_text: bool,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self { keep_whitespace_text: false }
    }

    /// Keep whitespace-only text nodes (dropped by default)
    pub fn keep_whitespace_text(mut self, keep: bool) -> Self {
        self.keep_whitespace_text = keep;
        self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);

        let mut tree = DomTree::new();
        let root = tree.root();
        self.convert(&dom.document, &mut tree, root);

        let document = Document::from_tree(tree, url);
        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Convert an RcDom subtree, appending converted children under `parent`
    fn convert(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) {
        let mut stack: Vec<(Handle, NodeId)> = handle
            .children
            .borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), parent))
            .collect();

        while let Some((handle, parent)) = stack.pop() {
            let id = match &handle.data {
                RcNodeData::Document => None,
                RcNodeData::Doctype { name, .. } => Some(tree.create_doctype(name)),
                RcNodeData::Text { contents } => {
                    let text = contents.borrow();
                    if !self.keep_whitespace_text && text.trim().is_empty() {
                        None
                    } else {
                        Some(tree.create_text(&text))
                    }
                }
                RcNodeData::Comment { contents } => Some(tree.create_comment(contents)),
                RcNodeData::Element { name, attrs, .. } => {
                    let attrs = attrs.borrow();
                    let pairs: Vec<(&str, &str)> = attrs
                        .iter()
                        .map(|a| (&*a.name.local, &*a.value))
                        .collect();
                    Some(tree.create_element_with_attrs(&name.local, &pairs))
                }
                // Processing instructions are dropped
                RcNodeData::ProcessingInstruction { .. } => None,
            };

            let Some(id) = id else { continue };
            if let Err(err) = tree.append_child(parent, id) {
                tracing::warn!("Dropping unattachable node {}: {}", id, err);
                continue;
            }
            for child in handle.children.borrow().iter().rev() {
                stack.push((child.clone(), id));
            }
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html);

        assert_eq!(doc.title(), "Test");
        let body = doc.body().unwrap();
        let p = doc.tree().first_child(body).unwrap();
        assert_eq!(doc.tree().local_name(p), Some("p"));
        assert_eq!(doc.tree().text_content(p), "Hello");
    }

    #[test]
    fn test_parse_fragment_gets_skeleton() {
        let doc = HtmlParser::new().parse("<div><span>Text</span></div>");

        // Even fragments get wrapped in html/head/body by html5ever
        assert!(doc.document_element().is_some());
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
    }

    #[test]
    fn test_whitespace_text_policy() {
        let html = "<body><div>\n  <p>a</p>\n</div></body>";
        let dropped = HtmlParser::new().parse(html);
        let kept = HtmlParser::new().keep_whitespace_text(true).parse(html);
        assert!(kept.tree().len() > dropped.tree().len());
    }
}
