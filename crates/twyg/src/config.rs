//! Coordinator configuration.
//!
//! Every marker the coordinator writes onto the document is configurable so
//! a host page can keep its own class names. Defaults match the stock
//! stylesheet:
//!
//! ```toml
//! active_class = "twyg-active"
//! edit_class = "twyg-edit"
//! content_editable_attribute = "contenteditable"
//! init_attribute = "data-twyg-init"
//! default_priority = 50
//! traversal = "descendants"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use twyg_core::logging::targets;

use crate::error::{Result, TwygError};
use crate::template::DEFAULT_PRIORITY;

/// How the tree initializer looks for child controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Traversal {
    /// Descend through nodes without a controller until a controllable
    /// node is found. Controllable grandchildren below plain wrappers
    /// become children of the nearest controlled ancestor.
    #[default]
    Descendants,
    /// Only consider direct child nodes. Controllable nodes below a plain
    /// wrapper are never discovered.
    DirectChildren,
}

/// Configuration for a [`Twyg`](crate::Twyg) coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwygConfig {
    /// Class added while a controller is active.
    pub active_class: String,
    /// Class added while a controller is editing.
    pub edit_class: String,
    /// Attribute set to `"true"` on content-editable controllers while editing.
    pub content_editable_attribute: String,
    /// Attribute marking nodes for [`Twyg::auto_init`](crate::Twyg::auto_init).
    pub init_attribute: String,
    /// Priority used when a template is registered without one.
    pub default_priority: u32,
    /// Child discovery strategy.
    pub traversal: Traversal,
}

impl Default for TwygConfig {
    fn default() -> Self {
        Self {
            active_class: "twyg-active".to_string(),
            edit_class: "twyg-edit".to_string(),
            content_editable_attribute: "contenteditable".to_string(),
            init_attribute: "data-twyg-init".to_string(),
            default_priority: DEFAULT_PRIORITY,
            traversal: Traversal::default(),
        }
    }
}

impl TwygConfig {
    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        tracing::debug!(target: targets::CONFIG, ?config, "parsed configuration");
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| TwygError::io(path, e))?;
        Self::from_toml_str(&source)
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Replace the child discovery strategy.
    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TwygConfig::default();
        assert_eq!(config.active_class, "twyg-active");
        assert_eq!(config.edit_class, "twyg-edit");
        assert_eq!(config.default_priority, 50);
        assert_eq!(config.traversal, Traversal::Descendants);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = TwygConfig::from_toml_str(
            r#"
            active_class = "is-active"
            traversal = "direct-children"
            "#,
        )
        .unwrap();
        assert_eq!(config.active_class, "is-active");
        assert_eq!(config.edit_class, "twyg-edit");
        assert_eq!(config.traversal, Traversal::DirectChildren);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            TwygConfig::from_toml_str("traversal = \"sideways\""),
            Err(TwygError::Config(_))
        ));
    }

    #[test]
    fn toml_round_trip() {
        let config = TwygConfig::default().with_traversal(Traversal::DirectChildren);
        let text = config.to_toml_string().unwrap();
        assert_eq!(TwygConfig::from_toml_str(&text).unwrap(), config);
    }
}
