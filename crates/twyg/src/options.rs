//! Controller options and their merge rules.
//!
//! A controller's effective options are computed once, at construction:
//! template defaults, then the options passed to `create`, then the node's
//! own `data-twyg-*` attributes. Later layers only override the flags they
//! actually set.

use serde::{Deserialize, Serialize};
use twyg_core::logging::targets;
use twyg_core::{Document, NodeId};

/// Data attribute overriding [`TemplateOptions::auto_activate`].
pub const AUTO_ACTIVATE_ATTRIBUTE: &str = "data-twyg-auto-activate";
/// Data attribute overriding [`TemplateOptions::permanent_edit`].
pub const PERMANENT_EDIT_ATTRIBUTE: &str = "data-twyg-permaedit";
/// Data attribute overriding [`TemplateOptions::content_editable`].
pub const CONTENT_EDITABLE_ATTRIBUTE: &str = "data-twyg-ce";

/// Fully resolved controller flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    /// Enter the active state right after construction.
    pub auto_activate: bool,
    /// Enter editing right after construction and never leave it.
    pub permanent_edit: bool,
    /// Mark the node content-editable while editing.
    pub content_editable: bool,
}

impl TemplateOptions {
    /// Apply the overrides that are set.
    pub fn merged(mut self, overrides: &ControllerOptions) -> Self {
        if let Some(value) = overrides.auto_activate {
            self.auto_activate = value;
        }
        if let Some(value) = overrides.permanent_edit {
            self.permanent_edit = value;
        }
        if let Some(value) = overrides.content_editable {
            self.content_editable = value;
        }
        self
    }
}

/// Per-call or per-node option overrides.
///
/// Deserializes from the JSON carried by `data-twyg-init`, for example
/// `{"autoActivate": true, "permaedit": false, "CE": true}`. Unknown keys are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    /// Override for auto-activation.
    #[serde(rename = "autoActivate", skip_serializing_if = "Option::is_none")]
    pub auto_activate: Option<bool>,
    /// Override for permanent-edit mode.
    #[serde(rename = "permaedit", skip_serializing_if = "Option::is_none")]
    pub permanent_edit: Option<bool>,
    /// Override for the content-editable flag.
    #[serde(rename = "CE", skip_serializing_if = "Option::is_none")]
    pub content_editable: Option<bool>,
}

impl ControllerOptions {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override auto-activation.
    pub fn auto_activate(mut self, value: bool) -> Self {
        self.auto_activate = Some(value);
        self
    }

    /// Override permanent-edit mode.
    pub fn permanent_edit(mut self, value: bool) -> Self {
        self.permanent_edit = Some(value);
        self
    }

    /// Override the content-editable flag.
    pub fn content_editable(mut self, value: bool) -> Self {
        self.content_editable = Some(value);
        self
    }

    /// Parse options from JSON. An empty or blank string means no overrides.
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(source)
    }

    /// Read the `data-twyg-*` overrides declared on a node.
    ///
    /// Accepted values are `true`, `false`, `1` and `0`. Anything else is
    /// logged and ignored.
    pub fn from_data_attributes(document: &Document, node: NodeId) -> Self {
        Self {
            auto_activate: read_flag(document, node, AUTO_ACTIVATE_ATTRIBUTE),
            permanent_edit: read_flag(document, node, PERMANENT_EDIT_ATTRIBUTE),
            content_editable: read_flag(document, node, CONTENT_EDITABLE_ATTRIBUTE),
        }
    }
}

fn read_flag(document: &Document, node: NodeId, attribute: &str) -> Option<bool> {
    let value = document.attribute(node, attribute)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => {
            tracing::warn!(target: targets::FACTORY, ?node, attribute, value, "ignoring unrecognized flag value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_only_overrides_set_flags() {
        let defaults = TemplateOptions {
            auto_activate: true,
            permanent_edit: false,
            content_editable: true,
        };
        let merged = defaults.merged(&ControllerOptions::new().content_editable(false));
        assert!(merged.auto_activate);
        assert!(!merged.permanent_edit);
        assert!(!merged.content_editable);
    }

    #[test]
    fn json_uses_short_keys() {
        let options = ControllerOptions::from_json(r#"{"autoActivate": true, "CE": false, "selector": "p"}"#).unwrap();
        assert_eq!(options, ControllerOptions::new().auto_activate(true).content_editable(false));
        assert_eq!(ControllerOptions::from_json("  ").unwrap(), ControllerOptions::new());
        assert!(ControllerOptions::from_json("{autoActivate").is_err());
        assert_eq!(
            serde_json::to_string(&ControllerOptions::new().permanent_edit(true)).unwrap(),
            r#"{"permaedit":true}"#
        );
    }

    #[test]
    fn data_attributes() {
        let mut doc = Document::new();
        let node = doc.create_element("p");
        doc.set_attribute(node, AUTO_ACTIVATE_ATTRIBUTE, "1").unwrap();
        doc.set_attribute(node, PERMANENT_EDIT_ATTRIBUTE, "False").unwrap();
        doc.set_attribute(node, CONTENT_EDITABLE_ATTRIBUTE, "maybe").unwrap();

        let options = ControllerOptions::from_data_attributes(&doc, node);
        assert_eq!(options.auto_activate, Some(true));
        assert_eq!(options.permanent_edit, Some(false));
        assert_eq!(options.content_editable, None);
    }
}
