//! The coordinator and the controller state machine.
//!
//! [`Twyg`] owns everything a click can touch: the document, the template
//! and node registries, the controller arena and the outside-click bindings.
//! Every transition borrows it mutably, so transitions never interleave.

use slotmap::SlotMap;
use twyg_core::logging::targets;
use twyg_core::{ControllerId, Document, DomError, NodeId, NodeRegistry, Signal};

use crate::config::TwygConfig;
use crate::controller::{Controller, ControllerState, EditOutcome, ExitOutcome, StateChange};
use crate::error::{Result, TwygError};
use crate::options::TemplateOptions;
use crate::outside_click::OutsideClick;
use crate::template::{Template, TemplateRegistry};

/// Owner of a document and the controller tree built over it.
///
/// # Example
///
/// ```
/// use twyg::{ControllerOptions, ControllerState, TemplateRegistry, Twyg, TwygConfig};
/// use twyg_core::Document;
///
/// let mut doc = Document::new();
/// let room = doc.create_element("div");
/// doc.append_child(doc.root(), room).unwrap();
/// let line = doc.create_element("p");
/// doc.append_child(room, line).unwrap();
///
/// let mut twyg = Twyg::new(doc, TemplateRegistry::with_builtin_templates(), TwygConfig::default());
/// let root = twyg.attach(room, &ControllerOptions::new().auto_activate(true)).unwrap().unwrap();
///
/// twyg.click(room).unwrap();
/// assert_eq!(twyg.state(root).unwrap(), ControllerState::Editing);
/// let line = twyg.controller_for(line).unwrap();
/// assert_eq!(twyg.state(line).unwrap(), ControllerState::Active);
/// ```
pub struct Twyg {
    pub(crate) document: Document,
    pub(crate) templates: TemplateRegistry,
    pub(crate) config: TwygConfig,
    pub(crate) registry: NodeRegistry,
    pub(crate) controllers: SlotMap<ControllerId, Controller>,
    pub(crate) outside_click: OutsideClick<ControllerId>,
    state_changed: Signal<StateChange>,
}

impl Twyg {
    /// Create a coordinator over `document`. No controllers exist until
    /// [`attach`](Self::attach) or [`auto_init`](Self::auto_init) runs.
    ///
    /// Templates registered later without a priority use
    /// [`TwygConfig::default_priority`].
    pub fn new(document: Document, mut templates: TemplateRegistry, config: TwygConfig) -> Self {
        templates.set_default_priority(config.default_priority);
        Self {
            document,
            templates,
            config,
            registry: NodeRegistry::new(),
            controllers: SlotMap::with_key(),
            outside_click: OutsideClick::new(),
            state_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document, for collaborators appending content.
    ///
    /// Nodes added here stay uncontrolled until
    /// [`initialize_children`](Self::initialize_children) runs on an
    /// ancestor controller.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The template registry.
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Register a template. Returns the priority it was filed under.
    pub fn register_template(&mut self, template: Template, priority: Option<u32>) -> u32 {
        self.templates.register(template, priority)
    }

    /// The configuration.
    pub fn config(&self) -> &TwygConfig {
        &self.config
    }

    /// Emitted whenever a controller's observable state changes.
    pub fn state_changed(&self) -> &Signal<StateChange> {
        &self.state_changed
    }

    /// Number of live controllers.
    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    /// Iterate over all live controllers.
    pub fn controllers(&self) -> impl Iterator<Item = (ControllerId, &Controller)> {
        self.controllers.iter()
    }

    /// The controller bound to `node`, if any.
    pub fn controller_for(&self, node: NodeId) -> Option<ControllerId> {
        self.registry
            .controller_for(node)
            .filter(|&id| self.controllers.contains_key(id))
    }

    /// The controller record for `id`.
    pub fn controller(&self, id: ControllerId) -> Result<&Controller> {
        match self.controllers.get(id) {
            Some(controller) if self.document.contains_node(controller.node) => Ok(controller),
            _ => Err(TwygError::InvalidController(id)),
        }
    }

    pub(crate) fn controller_mut(&mut self, id: ControllerId) -> Result<&mut Controller> {
        self.controllers.get_mut(id).ok_or(TwygError::InvalidController(id))
    }

    /// The node `id` is bound to.
    pub fn node_of(&self, id: ControllerId) -> Result<NodeId> {
        Ok(self.controller(id)?.node)
    }

    /// Current state of `id`.
    pub fn state(&self, id: ControllerId) -> Result<ControllerState> {
        Ok(self.controller(id)?.state())
    }

    /// Resolved options of `id`.
    pub fn options(&self, id: ControllerId) -> Result<TemplateOptions> {
        Ok(self.controller(id)?.options)
    }

    /// Nearest controlled ancestor of `id`.
    pub fn parent(&self, id: ControllerId) -> Result<Option<ControllerId>> {
        Ok(self.controller(id)?.parent)
    }

    /// Children of `id` in document order.
    pub fn children(&self, id: ControllerId) -> Result<&[ControllerId]> {
        Ok(&self.controller(id)?.children)
    }

    /// The other members of `id`'s sibling group.
    ///
    /// For a controller with a parent these are the parent's other children.
    /// A top-level controller's group is the other top-level controllers
    /// bound to children of the same document node. Controllers whose node
    /// was removed are left out.
    pub fn siblings(&self, id: ControllerId) -> Result<Vec<ControllerId>> {
        let controller = self.controller(id)?;
        if let Some(parent) = controller.parent {
            let mut siblings = self.live_children(parent)?;
            siblings.retain(|&sibling| sibling != id);
            return Ok(siblings);
        }

        let Some(parent_node) = self.document.parent(controller.node)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .document
            .children(parent_node)?
            .iter()
            .filter_map(|&node| self.controller_for(node))
            .filter(|&sibling| {
                sibling != id && self.controllers.get(sibling).is_some_and(|c| c.parent.is_none())
            })
            .collect())
    }

    /// Children of `id` whose nodes are still in the document.
    fn live_children(&self, id: ControllerId) -> Result<Vec<ControllerId>> {
        Ok(self
            .controller(id)?
            .children
            .iter()
            .copied()
            .filter(|&child| self.controller(child).is_ok())
            .collect())
    }

    /// Nearest ancestor of `node` that has a controller.
    pub fn nearest_controller(&self, node: NodeId) -> Result<Option<ControllerId>> {
        Ok(self
            .document
            .ancestors(node)?
            .into_iter()
            .find_map(|ancestor| self.controller_for(ancestor)))
    }

    /// Whether a click outside `id`'s node currently makes it exit.
    pub fn is_outside_click_bound(&self, id: ControllerId) -> Result<bool> {
        Ok(self.outside_click.is_bound(self.controller(id)?.node))
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Show the active marker and arm click-to-edit.
    ///
    /// Idempotent. On an editing controller only the marker changes.
    pub fn activate(&mut self, id: ControllerId) -> Result<()> {
        self.update(id, |controller| controller.active = true)
    }

    /// Clear the active marker and disarm click-to-edit. With `recurse`,
    /// the whole controller subtree is deactivated as well.
    ///
    /// Editing is left untouched.
    pub fn deactivate(&mut self, id: ControllerId, recurse: bool) -> Result<()> {
        self.update(id, |controller| controller.active = false)?;
        if recurse {
            for child in self.live_children(id)? {
                self.deactivate(child, true)?;
            }
        }
        Ok(())
    }

    /// Enter editing.
    ///
    /// An editing sibling is made to exit first, so a sibling group never
    /// has two editors. A permanent-edit sibling cannot exit and blocks the
    /// transition instead.
    pub fn edit(&mut self, id: ControllerId) -> Result<EditOutcome> {
        let controller = self.controller(id)?;
        if controller.editing {
            return Ok(EditOutcome::AlreadyEditing);
        }
        let node = controller.node;
        let parent = controller.parent;
        let permanent = controller.options.permanent_edit;
        let children = self.live_children(id)?;
        let siblings = self.siblings(id)?;

        for &sibling in &siblings {
            let other = self.controller(sibling)?;
            if other.editing && other.options.permanent_edit {
                tracing::debug!(target: targets::CONTROLLER, ?id, blocker = ?sibling, "edit blocked by permanent editor");
                return Ok(EditOutcome::BlockedBy(sibling));
            }
        }
        for &sibling in &siblings {
            if self.controller(sibling)?.editing {
                self.exit(sibling)?;
            }
        }

        if !permanent {
            self.outside_click.bind(node, id);
        }
        if let Some(parent) = parent {
            self.suppress_parent(parent)?;
        }

        self.deactivate(id, false)?;
        for &sibling in &siblings {
            self.deactivate(sibling, false)?;
        }
        for child in children {
            self.activate(child)?;
        }

        self.update(id, |controller| controller.editing = true)?;
        Ok(EditOutcome::Editing)
    }

    /// Leave editing.
    ///
    /// Returns [`ExitOutcome::NotHandled`] for permanent-edit controllers and
    /// for controllers that are not editing. Editing descendants exit first.
    pub fn exit(&mut self, id: ControllerId) -> Result<ExitOutcome> {
        let controller = self.controller(id)?;
        if controller.options.permanent_edit {
            tracing::debug!(target: targets::CONTROLLER, ?id, "permanent edit, exit not handled");
            return Ok(ExitOutcome::NotHandled);
        }
        if !controller.editing {
            return Ok(ExitOutcome::NotHandled);
        }
        let node = controller.node;
        let parent = controller.parent;

        for child in self.live_children(id)? {
            if self.controller(child)?.editing {
                self.exit(child)?;
            }
        }
        let siblings = self.siblings(id)?;

        // restore the parent before touching other controllers
        self.outside_click.unbind(node);
        self.controller_mut(id)?.suppressed = false;
        if let Some(parent) = parent {
            self.restore_parent(parent)?;
        }
        self.update(id, |controller| controller.editing = false)?;

        self.deactivate(id, true)?;
        self.activate(id)?;
        for sibling in siblings {
            self.activate(sibling)?;
        }
        Ok(ExitOutcome::Handled)
    }

    fn suppress_parent(&mut self, parent: ControllerId) -> Result<()> {
        let parent_node = self.controller(parent)?.node;
        if self.outside_click.unbind(parent_node).is_some() {
            self.controller_mut(parent)?.suppressed = true;
            tracing::trace!(target: targets::CONTROLLER, ?parent, "parent outside click suppressed");
        }
        Ok(())
    }

    pub(crate) fn restore_parent(&mut self, parent: ControllerId) -> Result<()> {
        let controller = self.controller_mut(parent)?;
        if !controller.suppressed {
            return Ok(());
        }
        controller.suppressed = false;
        if controller.editing && !controller.options.permanent_edit {
            let node = controller.node;
            self.outside_click.bind(node, parent);
            tracing::trace!(target: targets::CONTROLLER, ?parent, "parent outside click restored");
        }
        Ok(())
    }

    /// Apply `change` to a controller, bring the node's markers in line with
    /// the new flags and report a state change if there was one.
    fn update(&mut self, id: ControllerId, change: impl FnOnce(&mut Controller)) -> Result<()> {
        let node = self.controller(id)?.node;
        let controller = self.controller_mut(id)?;
        let from = controller.state();
        change(controller);
        let to = controller.state();
        let (active, editing, options) = (controller.active, controller.editing, controller.options);

        self.sync_markers(node, active, editing, options)?;

        if from != to {
            tracing::debug!(target: targets::CONTROLLER, ?id, ?node, %from, %to, "state changed");
            self.state_changed.emit(StateChange {
                controller: id,
                node,
                from,
                to,
            });
        }
        Ok(())
    }

    fn sync_markers(&mut self, node: NodeId, active: bool, editing: bool, options: TemplateOptions) -> Result<()> {
        let config = &self.config;
        let document = &mut self.document;
        if active {
            document.add_class(node, config.active_class.as_str())?;
        } else {
            document.remove_class(node, &config.active_class)?;
        }
        if editing {
            document.add_class(node, config.edit_class.as_str())?;
        } else {
            document.remove_class(node, &config.edit_class)?;
        }
        if options.content_editable {
            if editing {
                document.set_attribute(node, config.content_editable_attribute.as_str(), "true")?;
            } else {
                document.remove_attribute(node, &config.content_editable_attribute)?;
            }
        }
        Ok(())
    }

    pub(crate) fn check_node(&self, node: NodeId) -> Result<()> {
        if self.document.contains_node(node) {
            Ok(())
        } else {
            Err(DomError::InvalidNode(node).into())
        }
    }
}

impl std::fmt::Debug for Twyg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Twyg")
            .field("controllers", &self.controllers.len())
            .field("templates", &self.templates.len())
            .field("outside_click_bindings", &self.outside_click.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
