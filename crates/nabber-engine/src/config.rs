//! Engine configuration
//!
//! Everything the content script needs to know ahead of time: which
//! selectors identify a recipe card, where the overlay resources live, which
//! ids anchor the overlay markup, and the two timing knobs.

use std::path::Path;
use std::time::Duration;

use nabber_css::{SelectorError, SelectorList};
use serde::{Deserialize, Serialize};

/// Selectors recognising the common recipe plugins and schema.org markup
pub const DEFAULT_SELECTORS: &[&str] = &[
    ".recipe-callout",
    ".tasty-recipes",
    ".easyrecipe",
    ".innerrecipe",
    ".recipe-summary.wide",
    ".wprm-recipe-container",
    ".recipe-content",
    ".simple-recipe-pro",
    ".mv-recipe-card",
    ".recipe-detail-card",
    ".recipe--detail",
    ".recipe-body",
    r#"div[itemtype="http://schema.org/Recipe"]"#,
    r#"div[itemtype="https://schema.org/Recipe"]"#,
];

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read configuration {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid selector {pattern:?}: {source}")]
    Selector {
        pattern: String,
        #[source]
        source: SelectorError,
    },

    #[error("no selectors configured")]
    NoSelectors,
}

/// Content script configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Ordered selector strings; an element matching any of them is relocated
    pub selectors: Vec<String>,
    pub overlay: OverlayConfig,
    /// Delay before the metrics sample is taken
    pub settle_delay_ms: u64,
    /// Deferral applied to a reopen request before its state check
    pub reopen_delay_ms: u64,
}

/// Overlay resources and the ids the markup must provide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    pub markup_resource: String,
    pub stylesheet_resource: String,
    pub modal_id: String,
    pub content_id: String,
    pub title_id: String,
    pub close_button_id: String,
    /// Class put on `<body>` while the overlay is open
    pub active_class: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            overlay: OverlayConfig::default(),
            settle_delay_ms: 1000,
            reopen_delay_ms: 100,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            markup_resource: "RecipeCard.html".into(),
            stylesheet_resource: "RecipeCard.css".into(),
            modal_id: "recipeNabberModal".into(),
            content_id: "recipeNabberModalContent".into(),
            title_id: "recipeNabberTitle".into(),
            close_button_id: "recipeNabberCloseButton".into(),
            active_class: "recipeNabberModalOpen".into(),
        }
    }
}

impl Config {
    /// Parse a JSON configuration; missing fields keep their defaults
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Compile the configured selectors into one list
    ///
    /// Each entry is parsed on its own so a bad pattern is reported by name.
    pub fn selector_list(&self) -> Result<SelectorList, ConfigError> {
        if self.selectors.is_empty() {
            return Err(ConfigError::NoSelectors);
        }
        let mut list = SelectorList::default();
        for pattern in &self.selectors {
            let parsed =
                nabber_css::parse_selector_list(pattern).map_err(|source| ConfigError::Selector {
                    pattern: pattern.clone(),
                    source,
                })?;
            list.extend(parsed);
        }
        Ok(list)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn reopen_delay(&self) -> Duration {
        Duration::from_millis(self.reopen_delay_ms)
    }
}
