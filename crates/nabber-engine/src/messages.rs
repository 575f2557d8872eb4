//! Messages exchanged with the host application

use serde::{Deserialize, Serialize};

/// Message sent to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// How much reading the overlay spared the user
    #[serde(rename = "wordsSaved", rename_all = "camelCase")]
    WordsSaved {
        domain: String,
        words_saved: i64,
        first_recipe_element_scroll_top: f64,
    },
}

impl OutboundMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Message received from the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message")]
pub enum InboundMessage {
    /// The user asked for the recipe card again
    #[serde(rename = "didSelectReloadCell")]
    DidSelectReloadCell,

    /// Anything else is ignored
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_words_saved_wire_format() {
        let message = OutboundMessage::WordsSaved {
            domain: "cooking.example.com".into(),
            words_saved: -4,
            first_recipe_element_scroll_top: 812.5,
        };
        let value: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "wordsSaved",
                "domain": "cooking.example.com",
                "wordsSaved": -4,
                "firstRecipeElementScrollTop": 812.5,
            })
        );
    }

    #[test]
    fn test_inbound_reload() {
        assert_eq!(
            InboundMessage::from_json(r#"{"message":"didSelectReloadCell"}"#).unwrap(),
            InboundMessage::DidSelectReloadCell
        );
        assert_eq!(
            InboundMessage::from_json(r#"{"message":"somethingElse","extra":1}"#).unwrap(),
            InboundMessage::Unknown
        );
        assert!(InboundMessage::from_json(r#"{"type":"didSelectReloadCell"}"#).is_err());
    }
}
