//! Controller records and lifecycle states.
//!
//! A controller is the per-node half of the state machine. It stores only
//! data: the transitions live on [`Twyg`](crate::Twyg), which owns every
//! controller together with the document they mutate.

use std::fmt;

use twyg_core::{ControllerId, NodeId};

use crate::options::TemplateOptions;

/// Observable lifecycle state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControllerState {
    /// Initial state. No marker, no click-to-edit handler.
    #[default]
    Inactive,
    /// Shows the active marker; a click on the node starts editing.
    Active,
    /// Shows the edit marker.
    Editing,
}

impl ControllerState {
    /// Lowercase name used in logs and tree dumps.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::Editing => "editing",
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reported through [`Twyg::state_changed`](crate::Twyg::state_changed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// The controller whose state changed.
    pub controller: ControllerId,
    /// Its node.
    pub node: NodeId,
    /// State before the transition.
    pub from: ControllerState,
    /// State after the transition.
    pub to: ControllerState,
}

/// Result of [`Twyg::exit`](crate::Twyg::exit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The controller left editing. A click-off stops here.
    Handled,
    /// Nothing happened (permanent edit, or not editing). A click-off keeps
    /// bubbling.
    NotHandled,
}

impl ExitOutcome {
    /// Whether the exit was handled.
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Result of [`Twyg::edit`](crate::Twyg::edit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The controller entered editing.
    Editing,
    /// The controller was already editing.
    AlreadyEditing,
    /// A permanent-edit sibling is editing and cannot be made to exit.
    BlockedBy(ControllerId),
}

/// Per-node controller record.
#[derive(Debug, Clone)]
pub struct Controller {
    pub(crate) node: NodeId,
    pub(crate) template: String,
    pub(crate) options: TemplateOptions,
    pub(crate) parent: Option<ControllerId>,
    pub(crate) children: Vec<ControllerId>,
    pub(crate) active: bool,
    pub(crate) editing: bool,
    /// Set while this controller's outside-click binding is switched off by
    /// an editing child.
    pub(crate) suppressed: bool,
}

impl Controller {
    pub(crate) fn new(node: NodeId, template: &str, options: TemplateOptions, parent: Option<ControllerId>) -> Self {
        Self {
            node,
            template: template.to_string(),
            options,
            parent,
            children: Vec::new(),
            active: false,
            editing: false,
            suppressed: false,
        }
    }

    /// The node this controller is bound to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Name of the template that produced this controller.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Resolved options.
    pub fn options(&self) -> TemplateOptions {
        self.options
    }

    /// Nearest controlled ancestor.
    pub fn parent(&self) -> Option<ControllerId> {
        self.parent
    }

    /// Child controllers in document order.
    pub fn children(&self) -> &[ControllerId] {
        &self.children
    }

    /// Current lifecycle state. Editing takes precedence over active.
    pub fn state(&self) -> ControllerState {
        if self.editing {
            ControllerState::Editing
        } else if self.active {
            ControllerState::Active
        } else {
            ControllerState::Inactive
        }
    }

    /// Whether a click on the node currently starts editing.
    pub fn accepts_click(&self) -> bool {
        self.active && !self.editing
    }

    /// Whether the parent's outside-click binding is being held off by this
    /// controller's subtree.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }
}

#[cfg(test)]
mod tests {
    use twyg_core::Document;

    use super::*;

    fn controller() -> Controller {
        let mut doc = Document::new();
        let node = doc.create_element("p");
        Controller::new(node, "paragraph", TemplateOptions::default(), None)
    }

    #[test]
    fn state_is_derived_from_flags() {
        let mut c = controller();
        assert_eq!(c.state(), ControllerState::Inactive);
        assert!(!c.accepts_click());

        c.active = true;
        assert_eq!(c.state(), ControllerState::Active);
        assert!(c.accepts_click());

        c.editing = true;
        assert_eq!(c.state(), ControllerState::Editing);
        assert!(!c.accepts_click());

        c.active = false;
        assert_eq!(c.state(), ControllerState::Editing);
    }

    #[test]
    fn state_display() {
        assert_eq!(ControllerState::Editing.to_string(), "editing");
        assert_eq!(format!("{}", ControllerState::Inactive), "inactive");
        assert!(ExitOutcome::Handled.is_handled());
        assert!(!ExitOutcome::NotHandled.is_handled());
    }
}
