//! Selector parser
//!
//! Hand-written scanner over the selector text. Pseudo-classes and sibling
//! combinators are rejected rather than silently ignored, so a configured
//! pattern never matches more than it says.

use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    SelectorComponent, SelectorList,
};
use crate::SelectorError;

pub(crate) struct SelectorParser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    pub(crate) fn parse_list(mut self) -> Result<SelectorList, SelectorError> {
        let mut list = SelectorList::default();
        loop {
            self.skip_whitespace();
            list.selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => self.pos += 1,
                Some(c) => return Err(self.unexpected(c)),
            }
        }
        Ok(list)
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut selector = ComplexSelector {
            compounds: vec![self.parse_compound()?],
            combinators: Vec::new(),
        };

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(c @ ('+' | '~')) => return Err(self.unsupported(&c.to_string())),
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            };
            selector.combinators.push(combinator);
            selector.compounds.push(self.parse_compound()?);
        }
        Ok(selector)
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut compound = CompoundSelector::default();

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                compound.components.push(SelectorComponent::Universal);
            }
            Some(c) if is_ident_start(c) => {
                let tag = self.parse_ident()?;
                compound.components.push(SelectorComponent::Type(tag.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    compound.components.push(SelectorComponent::Class(self.parse_ident()?));
                }
                Some('#') => {
                    self.pos += 1;
                    compound.components.push(SelectorComponent::Id(self.parse_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.components.push(SelectorComponent::Attribute(self.parse_attribute()?));
                }
                Some(':') => {
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c == ':' || is_ident_char(c) || c == '(' || c == ')') {
                        self.pos += 1;
                    }
                    let syntax: String = self.chars[start..self.pos].iter().collect();
                    return Err(self.unsupported(&syntax));
                }
                _ => break,
            }
        }

        if compound.components.is_empty() {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None if self.source.trim().is_empty() => Err(SelectorError::Empty),
                None => Err(SelectorError::UnexpectedEnd(self.source.to_string())),
            };
        }
        Ok(compound)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let operator = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttributeSelector { name, matcher: None, case_insensitive: false });
            }
            Some('=') => {
                self.pos += 1;
                '='
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.pos += 1;
                self.expect('=')?;
                c
            }
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(self.end()),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_string(quote)?
            }
            Some(_) => self.parse_ident()?,
            None => return Err(self.end()),
        };

        self.skip_whitespace();
        let mut case_insensitive = false;
        match self.peek() {
            Some('i' | 'I') => {
                self.pos += 1;
                case_insensitive = true;
            }
            Some('s' | 'S') => self.pos += 1,
            _ => {}
        }
        self.skip_whitespace();
        self.expect(']')?;

        let matcher = match operator {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Contains(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector { name, matcher: Some(matcher), case_insensitive })
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                let escaped = self.peek().ok_or_else(|| self.end())?;
                ident.push(escaped);
                self.pos += 1;
            } else if is_ident_char(c) {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => self.end(),
            });
        }
        Ok(ident)
    }

    fn parse_string(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.end()),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some('\\') => {
                    self.pos += 1;
                    let escaped = self.peek().ok_or_else(|| self.end())?;
                    value.push(escaped);
                    self.pos += 1;
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(self.end()),
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.source.to_string(),
            offset: self.pos,
            found,
        }
    }

    fn unsupported(&self, syntax: &str) -> SelectorError {
        SelectorError::Unsupported {
            selector: self.source.to_string(),
            syntax: syntax.to_string(),
        }
    }

    fn end(&self) -> SelectorError {
        SelectorError::UnexpectedEnd(self.source.to_string())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
