//! Nabber HTML Parser
//!
//! HTML5 parsing built on html5ever. Produces a [`nabber_dom::Document`].

mod parser;

pub use parser::HtmlParser;

use nabber_dom::Document;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Parse an HTML string, recording `url` as the document URL
pub fn parse_with_url(html: &str, url: &str) -> Document {
    HtmlParser::new().parse_with_url(html, url)
}
