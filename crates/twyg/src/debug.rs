//! Controller tree dumps.

use std::fmt::Write as FmtWrite;

use twyg_core::{ControllerId, TreeFormatOptions};

use crate::error::Result;
use crate::twyg::Twyg;

/// Renders the controller tree of a [`Twyg`] for debugging.
///
/// ```text
/// div.chat-room.twyg-edit [editing] (division)
/// ├── div.chat-stream [active] (division)
/// └── div.chat-input [active] (division)
/// ```
#[derive(Debug, Clone, Default)]
pub struct ControllerTreeDebug {
    options: TreeFormatOptions,
}

impl ControllerTreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every top-level controller and its subtree, in document order.
    pub fn format(&self, twyg: &Twyg) -> Result<String> {
        let mut roots: Vec<ControllerId> = twyg
            .controllers()
            .filter(|(_, controller)| controller.parent().is_none())
            .map(|(id, _)| id)
            .collect();
        roots.sort_by(|&a, &b| {
            match (twyg.node_of(a), twyg.node_of(b)) {
                (Ok(a), Ok(b)) => twyg.document().compare_document_position(a, b),
                _ => std::cmp::Ordering::Equal,
            }
        });

        let mut output = String::new();
        for root in roots {
            self.format_into(twyg, root, 0, true, &mut output)?;
        }
        Ok(output)
    }

    /// Format the subtree rooted at `root`.
    pub fn format_subtree(&self, twyg: &Twyg, root: ControllerId) -> Result<String> {
        let mut output = String::new();
        self.format_into(twyg, root, 0, true, &mut output)?;
        Ok(output)
    }

    fn format_into(&self, twyg: &Twyg, id: ControllerId, depth: usize, is_last: bool, output: &mut String) -> Result<()> {
        if self.options.exceeds_depth(depth) {
            return Ok(());
        }
        let controller = twyg.controller(id)?;
        let document = twyg.document();
        let node = controller.node();

        output.push_str(&self.options.prefix(depth, is_last));
        output.push_str(document.tag(node)?);
        if let Some(element_id) = document.element_id(node) {
            let _ = write!(output, "#{element_id}");
        }
        if self.options.show_classes {
            for class in document.classes(node)? {
                let _ = write!(output, ".{class}");
            }
        }
        if self.options.show_state {
            let _ = write!(output, " [{}] ({})", controller.state(), controller.template());
        }
        if self.options.show_ids {
            let _ = write!(output, " {{{id:?} @ {node:?}}}");
        }
        output.push('\n');

        let children = controller.children();
        let count = children.len();
        for (index, &child) in children.iter().enumerate() {
            self.format_into(twyg, child, depth + 1, index + 1 == count, output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use twyg_core::{Document, TreeStyle};

    use super::*;
    use crate::config::TwygConfig;
    use crate::markup::parse_markup;
    use crate::options::ControllerOptions;
    use crate::template::TemplateRegistry;

    #[test]
    fn dumps_tree_with_state() {
        let mut doc = Document::new();
        let root = doc.root();
        let room = parse_markup(&mut doc, root, r#"<div class="chat-room"><p/><div class="chat-input"/></div>"#).unwrap()[0];
        let mut twyg = Twyg::new(doc, TemplateRegistry::with_builtin_templates(), TwygConfig::default());
        let id = twyg.attach(room, &ControllerOptions::new().auto_activate(true)).unwrap().unwrap();
        twyg.edit(id).unwrap();

        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            show_ids: false,
            ..Default::default()
        };
        let dump = ControllerTreeDebug::with_options(options).format(&twyg).unwrap();
        assert_eq!(
            dump,
            "div.chat-room.twyg-edit [editing] (division)\n\
             +-- p.twyg-active [active] (paragraph)\n\
             `-- div.chat-input.twyg-active [active] (division)\n"
        );
    }

    #[test]
    fn max_depth_truncates() {
        let mut doc = Document::new();
        let root = doc.root();
        let room = parse_markup(&mut doc, root, "<div><div><p/></div></div>").unwrap()[0];
        let mut twyg = Twyg::new(doc, TemplateRegistry::with_builtin_templates(), TwygConfig::default());
        twyg.attach(room, &ControllerOptions::new()).unwrap();

        let options = TreeFormatOptions {
            max_depth: Some(1),
            ..TreeFormatOptions::minimal()
        };
        let dump = ControllerTreeDebug::with_options(options).format(&twyg).unwrap();
        assert_eq!(dump.lines().count(), 2);
    }
}
