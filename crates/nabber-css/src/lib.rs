//! Nabber CSS Selectors
//!
//! Selector parsing and matching against a [`nabber_dom::DomTree`]:
//! type, class, id and attribute selectors, compound selectors, descendant
//! and child combinators, and comma-separated selector lists.

mod selectors;
mod parser;
mod query;

pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    SelectorComponent, SelectorList,
};
pub use query::{matches, query_selector, query_selector_all};

/// Parse a selector list such as `.recipe-content, div[itemtype="..."]`
pub fn parse_selector_list(text: &str) -> Result<SelectorList, SelectorError> {
    parser::SelectorParser::new(text).parse_list()
}

/// Selector parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected {found:?} at offset {offset} in selector {selector:?}")]
    Unexpected { selector: String, offset: usize, found: char },

    #[error("unexpected end of selector {0:?}")]
    UnexpectedEnd(String),

    #[error("unsupported selector syntax {syntax:?} in {selector:?}")]
    Unsupported { selector: String, syntax: String },
}
