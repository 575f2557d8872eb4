//! Selector model and matching
//!
//! Complex selectors are matched right to left, with backtracking over
//! ancestors for descendant combinators.

use nabber_dom::{DomTree, ElementData, NodeId};
use std::fmt;

/// A component of a compound selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeMatcher {
    fn operator(&self) -> &'static str {
        match self {
            Self::Exact(_) => "=",
            Self::Contains(_) => "~=",
            Self::DashMatch(_) => "|=",
            Self::Prefix(_) => "^=",
            Self::Suffix(_) => "$=",
            Self::Substring(_) => "*=",
        }
    }

    fn value(&self) -> &str {
        match self {
            Self::Exact(v)
            | Self::Contains(v)
            | Self::DashMatch(v)
            | Self::Prefix(v)
            | Self::Suffix(v)
            | Self::Substring(v) => v,
        }
    }
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(val)) = (&self.matcher, value) else {
            // [attr] only checks existence
            return self.matcher.is_none() && value.is_some();
        };

        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let val = fold(val);
        let expected = fold(matcher.value());

        match matcher {
            AttributeMatcher::Exact(_) => val == expected,
            AttributeMatcher::Contains(_) => val.split_whitespace().any(|w| w == expected),
            AttributeMatcher::DashMatch(_) => {
                val == expected || val.starts_with(&format!("{}-", expected))
            }
            // Empty operands never match for the substring family
            AttributeMatcher::Prefix(_) => !expected.is_empty() && val.starts_with(&expected),
            AttributeMatcher::Suffix(_) => !expected.is_empty() && val.ends_with(&expected),
            AttributeMatcher::Substring(_) => !expected.is_empty() && val.contains(&expected),
        }
    }
}

/// Match a selector component against an element
pub fn match_component(component: &SelectorComponent, element: &ElementData) -> bool {
    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => element.local_name().eq_ignore_ascii_case(tag),
        SelectorComponent::Id(id) => element.id() == Some(id.as_str()),
        SelectorComponent::Class(class) => element.has_class(class),
        SelectorComponent::Attribute(attr) => attr.matches(element.get_attr(&attr.name)),
    }
}

/// Sequence of simple selectors with no combinator, e.g. `div.recipe.wide`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    pub fn matches(&self, element: &ElementData) -> bool {
        self.components.iter().all(|c| match_component(c, element))
    }
}

/// Relationship between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace
    Descendant,
    /// `>`
    Child,
}

/// Compound selectors joined by combinators, e.g. `article > .recipe p`
///
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// Check whether `node` is matched by this selector
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.match_at(tree, node, n - 1),
        }
    }

    fn match_at(&self, tree: &DomTree, node: NodeId, index: usize) -> bool {
        let Some(element) = tree.element(node) else {
            return false;
        };
        if !self.compounds[index].matches(element) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|parent| self.match_at(tree, parent, index - 1)),
            Combinator::Descendant => {
                let mut ancestor = tree.parent(node);
                while let Some(current) = ancestor {
                    if self.match_at(tree, current, index - 1) {
                        return true;
                    }
                    ancestor = tree.parent(current);
                }
                false
            }
        }
    }
}

/// Comma-separated list of complex selectors
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// True if any selector in the list matches
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, node))
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Merge another list into this one
    pub fn extend(&mut self, other: SelectorList) {
        self.selectors.extend(other.selectors);
    }
}

impl fmt::Display for SelectorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Universal => write!(f, "*"),
            Self::Type(tag) => write!(f, "{}", tag),
            Self::Id(id) => write!(f, "#{}", id),
            Self::Class(class) => write!(f, ".{}", class),
            Self::Attribute(attr) => {
                write!(f, "[{}", attr.name)?;
                if let Some(matcher) = &attr.matcher {
                    write!(f, "{}\"{}\"", matcher.operator(), matcher.value())?;
                    if attr.case_insensitive {
                        write!(f, " i")?;
                    }
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "*");
        }
        for component in &self.components {
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, compound) in self.compounds.iter().enumerate() {
            if i > 0 {
                match self.combinators[i - 1] {
                    Combinator::Descendant => write!(f, " ")?,
                    Combinator::Child => write!(f, " > ")?,
                }
            }
            write!(f, "{}", compound)?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", selector)?;
        }
        Ok(())
    }
}
