//! Inline style declarations
//!
//! A minimal `CSSStyleDeclaration`: ordered `property: value` pairs read from
//! and written back to an element's `style` attribute.

/// Ordered list of inline declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclaration {
    declarations: Vec<(String, String)>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `style` attribute text. Malformed entries are dropped.
    pub fn parse(css_text: &str) -> Self {
        let mut style = Self::new();
        for decl in css_text.split(';') {
            let Some((property, value)) = decl.split_once(':') else {
                continue;
            };
            let property = property.trim();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                continue;
            }
            style.set(property, value);
        }
        style
    }

    /// Get a property value
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(property))
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, returning the previous value. An empty value removes it.
    pub fn set(&mut self, property: &str, value: &str) -> Option<String> {
        if value.trim().is_empty() {
            return self.remove(property);
        }
        let property = property.trim().to_ascii_lowercase();
        for (p, v) in self.declarations.iter_mut() {
            if *p == property {
                return Some(std::mem::replace(v, value.trim().to_string()));
            }
        }
        self.declarations.push((property, value.trim().to_string()));
        None
    }

    /// Remove a property
    pub fn remove(&mut self, property: &str) -> Option<String> {
        let pos = self
            .declarations
            .iter()
            .position(|(p, _)| p.eq_ignore_ascii_case(property))?;
        Some(self.declarations.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serialize back to attribute text
    pub fn to_css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{}: {};", p, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_garbage() {
        let style = StyleDeclaration::parse("color: red;;  : nothing; width:10px; junk");
        assert_eq!(style.len(), 2);
        assert_eq!(style.get("COLOR"), Some("red"));
        assert_eq!(style.get("width"), Some("10px"));
    }

    #[test]
    fn test_set_empty_removes() {
        let mut style = StyleDeclaration::parse("display: none");
        assert_eq!(style.set("display", "").as_deref(), Some("none"));
        assert!(style.is_empty());
        assert_eq!(style.to_css_text(), "");
    }
}
