//! Controller Factory.
//!
//! Finds the template that claims a node and builds a controller for it.
//! Template lookup is a total order: ascending priority, then registration
//! order, first match wins.

use twyg_core::logging::{span_names, targets};
use twyg_core::{ControllerId, NodeId};

use crate::controller::Controller;
use crate::error::Result;
use crate::options::ControllerOptions;
use crate::twyg::Twyg;

impl Twyg {
    /// Build a controller for `node`.
    ///
    /// Returns `Ok(None)` when the node already has a controller or no
    /// template claims it. Options are merged as template defaults, then
    /// `options`, then the node's `data-twyg-*` attributes.
    ///
    /// Construction initializes the children, then auto-activates, then
    /// enters permanent edit, in that order. The new controller is not
    /// linked into its parent's child list; [`attach`](Self::attach) and the
    /// tree initializer do that.
    pub fn create(&mut self, node: NodeId, options: &ControllerOptions) -> Result<Option<ControllerId>> {
        self.check_node(node)?;
        if let Some(existing) = self.controller_for(node) {
            tracing::trace!(target: targets::FACTORY, ?node, ?existing, "node already controlled");
            return Ok(None);
        }
        let Some((priority, template)) = self.templates.find(&self.document, node) else {
            return Ok(None);
        };

        let resolved = template
            .options()
            .merged(options)
            .merged(&ControllerOptions::from_data_attributes(&self.document, node));
        let name = template.name().to_string();
        let parent = self.nearest_controller(node)?;

        let _span = tracing::debug_span!(target: targets::FACTORY, span_names::ATTACH, ?node, template = %name).entered();
        let id = self.controllers.insert(Controller::new(node, &name, resolved, parent));
        self.registry.register(node, id)?;
        tracing::debug!(
            target: targets::FACTORY,
            ?id,
            ?node,
            template = %name,
            priority,
            ?parent,
            options = ?resolved,
            "controller created"
        );

        self.initialize_children(id)?;
        if resolved.auto_activate {
            self.activate(id)?;
        }
        if resolved.permanent_edit {
            self.edit(id)?;
        }
        Ok(Some(id))
    }

    /// Attach a controller to `node` and build its subtree.
    ///
    /// If `node` sits below an existing controller, the new controller is
    /// linked into that controller's children in document order. Returns
    /// `Ok(None)` for the same reasons as [`create`](Self::create).
    pub fn attach(&mut self, node: NodeId, options: &ControllerOptions) -> Result<Option<ControllerId>> {
        self.prune();
        let Some(id) = self.create(node, options)? else {
            return Ok(None);
        };
        if let Some(parent) = self.controller(id)?.parent {
            self.link_child(parent, id)?;
        }
        Ok(Some(id))
    }

    /// Insert `child` into `parent`'s children, keeping document order.
    pub(crate) fn link_child(&mut self, parent: ControllerId, child: ControllerId) -> Result<()> {
        let child_node = self.controller(child)?.node;
        let siblings = self.controller(parent)?.children.clone();
        if siblings.contains(&child) {
            return Ok(());
        }
        let mut position = siblings.len();
        for (index, &sibling) in siblings.iter().enumerate() {
            let sibling_node = self.controller(sibling)?.node;
            if self.document.compare_document_position(child_node, sibling_node).is_lt() {
                position = index;
                break;
            }
        }
        self.controller_mut(parent)?.children.insert(position, child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use twyg_core::Document;

    use crate::config::TwygConfig;
    use crate::controller::ControllerState;
    use crate::template::{Template, TemplateRegistry};

    use super::*;

    fn single(tag: &str, templates: TemplateRegistry) -> (Twyg, NodeId) {
        let mut doc = Document::new();
        let node = doc.create_element(tag);
        doc.append_child(doc.root(), node).unwrap();
        (Twyg::new(doc, templates, TwygConfig::default()), node)
    }

    #[test]
    fn lower_priority_number_wins() {
        let mut templates = TemplateRegistry::new();
        templates.register(Template::parse("late", "p").unwrap(), Some(20));
        templates.register(Template::parse("early", "*").unwrap(), Some(10));
        let (mut twyg, node) = single("p", templates);

        let id = twyg.create(node, &ControllerOptions::new()).unwrap().unwrap();
        assert_eq!(twyg.controller(id).unwrap().template(), "early");
    }

    #[test]
    fn registration_order_breaks_ties() {
        let mut templates = TemplateRegistry::new();
        templates.register(Template::parse("first", "p").unwrap(), None);
        templates.register(Template::parse("second", "*").unwrap(), None);
        let (mut twyg, node) = single("p", templates);

        let id = twyg.create(node, &ControllerOptions::new()).unwrap().unwrap();
        assert_eq!(twyg.controller(id).unwrap().template(), "first");
    }

    #[test]
    fn second_create_returns_none() {
        let (mut twyg, node) = single("p", TemplateRegistry::with_builtin_templates());
        let first = twyg.create(node, &ControllerOptions::new()).unwrap();
        assert!(first.is_some());
        assert_eq!(twyg.create(node, &ControllerOptions::new()).unwrap(), None);
        assert_eq!(twyg.controller_count(), 1);
        assert_eq!(twyg.controller_for(node), first);
    }

    #[test]
    fn unmatched_node_is_not_an_error() {
        let (mut twyg, node) = single("span", TemplateRegistry::with_builtin_templates());
        assert_eq!(twyg.create(node, &ControllerOptions::new()).unwrap(), None);
        assert_eq!(twyg.controller_count(), 0);
    }

    #[test]
    fn options_merge_in_order() {
        let (mut twyg, node) = single("p", TemplateRegistry::with_builtin_templates());
        twyg.document_mut().set_attribute(node, "data-twyg-ce", "false").unwrap();

        let options = ControllerOptions::new().auto_activate(true).content_editable(true);
        let id = twyg.create(node, &options).unwrap().unwrap();

        let resolved = twyg.options(id).unwrap();
        assert!(resolved.auto_activate);
        assert!(!resolved.content_editable);
        assert_eq!(twyg.state(id).unwrap(), ControllerState::Active);
    }

    #[test]
    fn attach_links_into_existing_parent() {
        let mut doc = Document::new();
        let room = doc.create_element("div");
        doc.append_child(doc.root(), room).unwrap();
        let first = doc.create_element("p");
        doc.append_child(room, first).unwrap();
        let mut twyg = Twyg::new(doc, TemplateRegistry::with_builtin_templates(), TwygConfig::default());
        let root = twyg.attach(room, &ControllerOptions::new()).unwrap().unwrap();

        let appended = twyg.document_mut().create_element("p");
        twyg.document_mut().append_child(room, appended).unwrap();

        let late = twyg.attach(appended, &ControllerOptions::new()).unwrap().unwrap();
        assert_eq!(twyg.parent(late).unwrap(), Some(root));
        let children = twyg.children(root).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], twyg.controller_for(first).unwrap());
        assert_eq!(children[1], late);
    }
}
