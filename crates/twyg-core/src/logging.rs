//! Logging and debugging facilities for Twyg.
//!
//! This module provides:
//! - Target and span names for filtering `tracing` output per subsystem
//! - Tree formatting options shared by the document and controller dumps
//! - [`DocumentTreeDebug`] for printing a [`Document`]
//!
//! # Tracing Integration
//!
//! Twyg only emits events through the `tracing` crate. To see them, install
//! a subscriber in the host:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("twyg::controller=debug,twyg::factory=trace")
//!     .init();
//! ```

use std::fmt::{self, Write as FmtWrite};

use crate::dom::{Document, NodeId};
use crate::error::DomResult;

/// Span names used throughout Twyg for tracing.
pub mod span_names {
    /// Click dispatch span.
    pub const CLICK: &str = "twyg::click";
    /// Child initialization span.
    pub const INITIALIZE: &str = "twyg::initialize";
    /// Controller creation span.
    pub const ATTACH: &str = "twyg::attach";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core target.
    pub const CORE: &str = "twyg_core";
    /// Document model target.
    pub const DOM: &str = "twyg_core::dom";
    /// Node registry target.
    pub const REGISTRY: &str = "twyg_core::registry";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "twyg_core::signal";
    /// Template lookup and controller creation.
    pub const FACTORY: &str = "twyg::factory";
    /// Controller state transitions.
    pub const CONTROLLER: &str = "twyg::controller";
    /// Outside-click bindings and firing.
    pub const OUTSIDE_CLICK: &str = "twyg::outside_click";
    /// Click dispatch.
    pub const DISPATCH: &str = "twyg::dispatch";
    /// Markup loading.
    pub const MARKUP: &str = "twyg::markup";
    /// Configuration loading.
    pub const CONFIG: &str = "twyg::config";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node and controller IDs.
    pub show_ids: bool,
    /// Whether to show class lists.
    pub show_classes: bool,
    /// Whether to show controller state and options.
    pub show_state: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_classes: true,
            show_state: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self::default()
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_classes: false,
            show_state: false,
            ..Default::default()
        }
    }

    /// Whether a node at `depth` is beyond the configured limit.
    pub fn exceeds_depth(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth > max)
    }

    /// Build the prefix string for a tree line.
    pub fn prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

/// Debug utility for printing the element tree of a [`Document`].
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    options: TreeFormatOptions,
}

impl DocumentTreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole document.
    pub fn format_document(&self, document: &Document) -> DomResult<String> {
        self.format_subtree(document, document.root())
    }

    /// Format the subtree rooted at `root`.
    pub fn format_subtree(&self, document: &Document, root: NodeId) -> DomResult<String> {
        let mut output = String::new();
        self.format_into(document, root, 0, true, &mut output)?;
        Ok(output)
    }

    fn format_into(
        &self,
        document: &Document,
        id: NodeId,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> DomResult<()> {
        if self.options.exceeds_depth(depth) {
            return Ok(());
        }

        output.push_str(&self.options.prefix(depth, is_last));
        output.push_str(document.tag(id)?);
        if let Some(element_id) = document.element_id(id) {
            let _ = write!(output, "#{element_id}");
        }
        if self.options.show_classes {
            for class in document.classes(id)? {
                let _ = write!(output, ".{class}");
            }
        }
        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        output.push('\n');

        let children = document.children(id)?;
        let count = children.len();
        for (index, &child) in children.iter().enumerate() {
            self.format_into(document, child, depth + 1, index + 1 == count, output)?;
        }
        Ok(())
    }
}

/// Wraps a document so `{}` prints its tree with default options.
pub struct DisplayDocument<'a>(pub &'a Document);

impl fmt::Display for DisplayDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DocumentTreeDebug::with_options(TreeFormatOptions::minimal()).format_document(self.0) {
            Ok(tree) => f.write_str(&tree),
            Err(err) => write!(f, "<error: {err}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_styles() {
        let ascii = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        assert_eq!(ascii.prefix(0, true), "");
        assert_eq!(ascii.prefix(1, false), "+-- ");
        assert_eq!(ascii.prefix(2, true), "|  `-- ");
    }

    #[test]
    fn test_format_document_minimal() {
        let mut doc = Document::new();
        let room = doc.create_element("div");
        doc.add_class(room, "chat-room").unwrap();
        let row = doc.create_element("p");
        doc.append_child(doc.root(), room).unwrap();
        doc.append_child(room, row).unwrap();

        let output = DisplayDocument(&doc).to_string();
        assert_eq!(
            output,
            "#document\n\u{2514}\u{2500}\u{2500} div\n\u{2502}  \u{2514}\u{2500}\u{2500} p\n"
        );
    }

    #[test]
    fn test_format_document_classes_and_depth() {
        let mut doc = Document::new();
        let room = doc.create_element("div");
        doc.set_attribute(room, "class", "chat-room twyg-active").unwrap();
        doc.set_attribute(room, "id", "room").unwrap();
        let row = doc.create_element("p");
        doc.append_child(doc.root(), room).unwrap();
        doc.append_child(room, row).unwrap();

        let debug = DocumentTreeDebug::with_options(TreeFormatOptions {
            show_ids: false,
            max_depth: Some(1),
            ..Default::default()
        });
        let output = debug.format_document(&doc).unwrap();
        assert!(output.contains("div#room.chat-room.twyg-active"));
        assert!(!output.contains(" p"));
    }
}
