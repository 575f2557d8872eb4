//! Overlay resources
//!
//! The overlay markup and stylesheet are named resources resolved through a
//! [`ResourceResolver`]: bundled into the binary by default, or read from a
//! directory when the card is being customised.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

const RECIPE_CARD_HTML: &str = include_str!("../resources/RecipeCard.html");
const RECIPE_CARD_CSS: &str = include_str!("../resources/RecipeCard.css");

/// Base URL of the bundled resources
pub const BUNDLED_BASE_URL: &str = "extension://recipe-nabber/";

/// Resource lookup errors
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("invalid resource name: {0}")]
    InvalidName(String),

    #[error("failed to read resource {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves named resources to URLs and text
pub trait ResourceResolver {
    /// URL a page would use to reference the resource
    fn url_for(&self, name: &str) -> Result<String, ResourceError>;

    /// Load the resource text
    fn fetch_text(&self, name: &str) -> impl Future<Output = Result<String, ResourceError>>;
}

/// Resources compiled into the engine
#[derive(Debug, Clone)]
pub struct BundledResources {
    base_url: String,
    files: HashMap<String, String>,
}

impl BundledResources {
    /// An empty bundle under `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            files: HashMap::new(),
        }
    }

    /// Add or replace a resource
    pub fn with(mut self, name: &str, text: &str) -> Self {
        self.files.insert(name.to_string(), text.to_string());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }
}

impl Default for BundledResources {
    /// The stock recipe card
    fn default() -> Self {
        Self::new(BUNDLED_BASE_URL)
            .with("RecipeCard.html", RECIPE_CARD_HTML)
            .with("RecipeCard.css", RECIPE_CARD_CSS)
    }
}

impl ResourceResolver for BundledResources {
    fn url_for(&self, name: &str) -> Result<String, ResourceError> {
        Ok(format!("{}{}", self.base_url, name))
    }

    async fn fetch_text(&self, name: &str) -> Result<String, ResourceError> {
        debug!(name, "loading bundled resource");
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(name.to_string()))
    }
}

/// Resources read from a directory on disk
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a resource name to a path below the root
    fn path_for(&self, name: &str) -> Result<PathBuf, ResourceError> {
        let relative = Path::new(name);
        let plain = !name.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !plain {
            return Err(ResourceError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ResourceResolver for DirectoryResources {
    fn url_for(&self, name: &str) -> Result<String, ResourceError> {
        let path = self.path_for(name)?;
        let absolute = std::path::absolute(&path).map_err(|source| ResourceError::Io {
            name: name.to_string(),
            source,
        })?;
        url::Url::from_file_path(&absolute)
            .map(String::from)
            .map_err(|()| ResourceError::InvalidName(name.to_string()))
    }

    async fn fetch_text(&self, name: &str) -> Result<String, ResourceError> {
        let path = self.path_for(name)?;
        debug!(path = %path.display(), "loading resource from disk");
        smol::fs::read_to_string(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ResourceError::NotFound(name.to_string())
            } else {
                ResourceError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_card_present() {
        let resources = BundledResources::default();
        let html = smol::block_on(resources.fetch_text("RecipeCard.html")).unwrap();
        assert!(html.contains("recipeNabberModalContent"));
        assert_eq!(
            resources.url_for("RecipeCard.css").unwrap(),
            "extension://recipe-nabber/RecipeCard.css"
        );
        assert!(matches!(
            smol::block_on(resources.fetch_text("Missing.html")),
            Err(ResourceError::NotFound(_))
        ));
    }

    #[test]
    fn test_directory_rejects_escaping_names() {
        let resources = DirectoryResources::new("/tmp/cards");
        for name in ["../secret", "/etc/passwd", "", "a/../../b"] {
            assert!(
                matches!(resources.path_for(name), Err(ResourceError::InvalidName(_))),
                "{name} should be rejected"
            );
        }
        assert_eq!(
            resources.path_for("themes/dark.css").unwrap(),
            PathBuf::from("/tmp/cards/themes/dark.css")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_url_is_escaped() {
        let resources = DirectoryResources::new("/tmp/my cards");
        assert_eq!(
            resources.url_for("Card #1.css").unwrap(),
            "file:///tmp/my%20cards/Card%20%231.css"
        );
        assert!(matches!(resources.url_for("../x.css"), Err(ResourceError::InvalidName(_))));
    }

    #[test]
    fn test_directory_reads_file() {
        let dir = std::env::temp_dir().join(format!("nabber-resources-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Card.html"), "<div id=\"x\"></div>").unwrap();

        let resources = DirectoryResources::new(&dir);
        let text = smol::block_on(resources.fetch_text("Card.html")).unwrap();
        assert_eq!(text, "<div id=\"x\"></div>");
        assert!(matches!(
            smol::block_on(resources.fetch_text("Nope.html")),
            Err(ResourceError::NotFound(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
