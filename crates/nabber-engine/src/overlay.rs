//! Overlay construction
//!
//! The overlay markup is parsed into its own document, checked for the
//! anchor elements, and only then copied into the host tree. A template
//! missing an anchor never leaves anything behind in the host.

use nabber_dom::{Document, DomResult, DomTree, NodeId};
use tracing::debug;

use crate::config::OverlayConfig;
use crate::NabberError;

/// Handles to the overlay's anchor elements inside the host tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    pub modal: NodeId,
    pub content: NodeId,
    pub title: NodeId,
    pub close_button: NodeId,
}

impl Overlay {
    /// Copy the modal out of a parsed template into `host`, detached
    ///
    /// Every call imports a fresh copy. The arena never frees nodes, so an
    /// overlay replaced on reopen stays behind as a detached subtree.
    pub fn build(host: &mut DomTree, template: &Document, ids: &OverlayConfig) -> Result<Self, NabberError> {
        let modal = template
            .get_element_by_id(&ids.modal_id)
            .ok_or_else(|| NabberError::MissingAnchor(ids.modal_id.clone()))?;
        let source = template.tree();
        for id in [&ids.content_id, &ids.title_id, &ids.close_button_id] {
            if source.find_by_id(modal, id).is_none() {
                return Err(NabberError::MissingAnchor(id.clone()));
            }
        }

        let copy = host
            .import_subtree(source, modal)
            .ok_or_else(|| NabberError::MissingAnchor(ids.modal_id.clone()))?;
        let find = |id: &String| {
            host.find_by_id(copy, id)
                .ok_or_else(|| NabberError::MissingAnchor(id.clone()))
        };
        let overlay = Self {
            modal: copy,
            content: find(&ids.content_id)?,
            title: find(&ids.title_id)?,
            close_button: find(&ids.close_button_id)?,
        };
        debug!(modal = %overlay.modal, "overlay built");
        Ok(overlay)
    }

    /// Insert the modal as the first child of `<body>`
    pub fn attach(&self, doc: &mut Document) -> Result<(), NabberError> {
        let body = doc.body().ok_or(NabberError::MissingHostElement("body"))?;
        doc.tree.prepend_child(body, self.modal)?;
        Ok(())
    }

    pub fn hide(&self, tree: &mut DomTree) -> DomResult<()> {
        tree.set_style_property(self.modal, "display", "none")?;
        Ok(())
    }

    /// Take the modal out of the document
    pub fn remove(&self, tree: &mut DomTree) {
        tree.detach(self.modal);
    }

    pub fn is_attached(&self, tree: &DomTree) -> bool {
        tree.is_connected(self.modal)
    }

    pub fn is_hidden(&self, tree: &DomTree) -> bool {
        tree.style_property(self.modal, "display").as_deref() == Some("none")
    }

    /// Whether a click on `target` lands on the close button
    pub fn is_close_target(&self, tree: &DomTree, target: NodeId) -> bool {
        tree.contains(self.close_button, target)
    }

    /// Give the close button the title's inline colour
    pub fn match_close_button_color(&self, tree: &mut DomTree) -> DomResult<()> {
        let color = tree.style_property(self.title, "color").unwrap_or_default();
        tree.set_style_property(self.close_button, "color", &color)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"<html><body>
        <div id="recipeNabberModal">
          <h1 id="recipeNabberTitle" style="color: rebeccapurple">Recipe</h1>
          <button id="recipeNabberCloseButton"><span>x</span></button>
          <div id="recipeNabberModalContent"></div>
        </div></body></html>"#;

    #[test]
    fn test_build_finds_anchors_and_stays_detached() {
        let template = nabber_html::parse(TEMPLATE);
        let mut host = Document::new("https://example.com/");
        let before = host.tree.len();

        let overlay = Overlay::build(&mut host.tree, &template, &OverlayConfig::default()).unwrap();
        assert!(host.tree.len() > before);
        assert!(!overlay.is_attached(&host.tree));
        assert_eq!(host.tree.local_name(overlay.title), Some("h1"));
        assert_eq!(host.tree.parent(overlay.content), Some(overlay.modal));

        overlay.attach(&mut host).unwrap();
        let body = host.body().unwrap();
        assert_eq!(host.tree.first_child(body), Some(overlay.modal));
        assert_eq!(host.get_element_by_id("recipeNabberModalContent"), Some(overlay.content));
    }

    #[test]
    fn test_missing_anchor_leaves_host_untouched() {
        let template = nabber_html::parse(r#"<div id="recipeNabberModal"><div id="recipeNabberTitle"></div></div>"#);
        let mut host = Document::new("https://example.com/");
        let before = host.tree.len();

        let err = Overlay::build(&mut host.tree, &template, &OverlayConfig::default()).unwrap_err();
        assert!(matches!(err, NabberError::MissingAnchor(ref id) if id == "recipeNabberModalContent"));
        assert_eq!(host.tree.len(), before);

        let empty = nabber_html::parse("<p>nothing</p>");
        let err = Overlay::build(&mut host.tree, &empty, &OverlayConfig::default()).unwrap_err();
        assert!(matches!(err, NabberError::MissingAnchor(ref id) if id == "recipeNabberModal"));
    }

    #[test]
    fn test_close_target_and_color() {
        let template = nabber_html::parse(TEMPLATE);
        let mut host = Document::new("https://example.com/");
        let overlay = Overlay::build(&mut host.tree, &template, &OverlayConfig::default()).unwrap();

        let icon = host.tree.first_child(overlay.close_button).unwrap();
        assert!(overlay.is_close_target(&host.tree, overlay.close_button));
        assert!(overlay.is_close_target(&host.tree, icon));
        assert!(!overlay.is_close_target(&host.tree, overlay.title));

        overlay.match_close_button_color(&mut host.tree).unwrap();
        assert_eq!(
            host.tree.style_property(overlay.close_button, "color").as_deref(),
            Some("rebeccapurple")
        );

        overlay.hide(&mut host.tree).unwrap();
        assert!(overlay.is_hidden(&host.tree));
    }

    #[test]
    fn test_replaced_overlay_stays_in_arena_detached() {
        let template = nabber_html::parse(TEMPLATE);
        let mut host = Document::new("https://example.com/");
        let first = Overlay::build(&mut host.tree, &template, &OverlayConfig::default()).unwrap();
        first.attach(&mut host).unwrap();
        let after_first = host.tree.len();

        let second = Overlay::build(&mut host.tree, &template, &OverlayConfig::default()).unwrap();
        assert_ne!(second.modal, first.modal);
        second.attach(&mut host).unwrap();
        first.remove(&mut host.tree);

        assert!(host.tree.len() > after_first);
        assert!(!first.is_attached(&host.tree));
        assert_eq!(host.tree.local_name(first.title), Some("h1"));
        assert_eq!(host.get_element_by_id("recipeNabberModal"), Some(second.modal));
    }
}
