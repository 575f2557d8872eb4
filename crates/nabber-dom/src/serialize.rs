//! HTML serialization (`outerHTML`)

use crate::{DomTree, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "source", "track", "wbr",
];

impl DomTree {
    /// Serialize a node and its subtree
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize only the children of a node
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, root: NodeId, out: &mut String) {
        // Explicit stack of pending opens and close tags
        enum Step<'a> {
            Open(NodeId),
            Close(&'a str),
        }
        let mut stack = vec![Step::Open(root)];
        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Close(name) => {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                    continue;
                }
                Step::Open(id) => id,
            };
            let Some(node) = self.get(id) else { continue };
            match &node.data {
                NodeData::Document => {
                    let children: Vec<_> = self.children(id).collect();
                    stack.extend(children.into_iter().rev().map(Step::Open));
                }
                NodeData::Doctype { name } => {
                    out.push_str("<!DOCTYPE ");
                    out.push_str(name);
                    out.push('>');
                }
                NodeData::Text(text) => out.push_str(&escape(text, false)),
                NodeData::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                NodeData::Element(elem) => {
                    out.push('<');
                    out.push_str(&elem.name);
                    for attr in &elem.attrs {
                        out.push(' ');
                        out.push_str(&attr.name);
                        out.push_str("=\"");
                        out.push_str(&escape(&attr.value, true));
                        out.push('"');
                    }
                    out.push('>');
                    if VOID_ELEMENTS.contains(&elem.name.as_str()) {
                        continue;
                    }
                    stack.push(Step::Close(&elem.name));
                    let children: Vec<_> = self.children(id).collect();
                    stack.extend(children.into_iter().rev().map(Step::Open));
                }
            }
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}
