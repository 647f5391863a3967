//! Tree Initializer and auto-initialization.

use twyg_core::logging::{span_names, targets};
use twyg_core::{ControllerId, NodeId};

use crate::config::Traversal;
use crate::error::Result;
use crate::options::ControllerOptions;
use crate::twyg::Twyg;

impl Twyg {
    /// (Re)build the child controllers of `id`.
    ///
    /// Existing controllers below the node are kept, nodes appended since the
    /// last run get controllers, and the child list is rebuilt in document
    /// order. With [`Traversal::Descendants`] the walk passes through
    /// uncontrolled nodes; it never descends below a controlled one.
    /// Children are created without option overrides.
    pub fn initialize_children(&mut self, id: ControllerId) -> Result<()> {
        let node = self.controller(id)?.node;
        let _span = tracing::debug_span!(target: targets::FACTORY, span_names::INITIALIZE, ?id).entered();

        self.prune();
        let previous = std::mem::take(&mut self.controller_mut(id)?.children);
        let candidates = self.document.children(node)?.to_vec();
        self.collect_children(id, candidates)?;

        let current = self.controller(id)?.children.clone();
        for orphan in previous.into_iter().filter(|child| !current.contains(child)) {
            // moved out from under this controller
            if let Some(orphan_node) = self.controllers.get(orphan).map(|c| c.node) {
                let parent = self.nearest_controller(orphan_node)?.filter(|&parent| parent != id);
                self.controller_mut(orphan)?.parent = parent;
                if let Some(parent) = parent {
                    self.link_child(parent, orphan)?;
                }
            }
        }

        tracing::debug!(target: targets::FACTORY, ?id, children = current.len(), "children initialized");
        Ok(())
    }

    fn collect_children(&mut self, id: ControllerId, nodes: Vec<NodeId>) -> Result<()> {
        for node in nodes {
            if let Some(existing) = self.controller_for(node) {
                let old_parent = self.controller(existing)?.parent;
                if let Some(old_parent) = old_parent.filter(|&old| old != id) {
                    self.controller_mut(old_parent)?.children.retain(|&child| child != existing);
                }
                self.controller_mut(existing)?.parent = Some(id);
                self.controller_mut(id)?.children.push(existing);
                continue;
            }

            if let Some(child) = self.create(node, &ControllerOptions::default())? {
                self.controller_mut(id)?.children.push(child);
                continue;
            }

            if self.config.traversal == Traversal::Descendants {
                let grandchildren = self.document.children(node)?.to_vec();
                self.collect_children(id, grandchildren)?;
            }
        }
        Ok(())
    }

    /// Attach every node carrying the init attribute, in document order.
    ///
    /// The attribute value is read as [`ControllerOptions`] JSON. An empty
    /// value means no overrides; invalid JSON is logged and treated the
    /// same way. Nodes already covered by an earlier attach are skipped.
    pub fn auto_init(&mut self) -> Result<Vec<ControllerId>> {
        let attribute = self.config.init_attribute.clone();
        let mut attached = Vec::new();
        for node in self.document.nodes_with_attribute(&attribute) {
            let source = self.document.attribute(node, &attribute).unwrap_or_default();
            let options = match ControllerOptions::from_json(source) {
                Ok(options) => options,
                Err(error) => {
                    tracing::warn!(target: targets::FACTORY, ?node, %error, "ignoring invalid init options");
                    ControllerOptions::default()
                }
            };
            if let Some(id) = self.attach(node, &options)? {
                attached.push(id);
            }
        }
        tracing::debug!(target: targets::FACTORY, count = attached.len(), "auto init finished");
        Ok(attached)
    }

    /// Drop controllers whose nodes were removed from the document.
    ///
    /// Bindings are released and parents held off by a removed editor get
    /// their outside-click exit back. Returns the dropped controllers.
    pub fn prune(&mut self) -> Vec<ControllerId> {
        let dropped = self.registry.retain_live(&self.document);
        if dropped.is_empty() {
            return dropped;
        }

        let mut parents = Vec::new();
        for &id in &dropped {
            if let Some(controller) = self.controllers.remove(id) {
                self.outside_click.unbind(controller.node);
                if controller.editing {
                    parents.extend(controller.parent);
                }
            }
        }
        for controller in self.controllers.values_mut() {
            controller.children.retain(|child| !dropped.contains(child));
        }
        for parent in parents {
            // a parent removed in the same sweep has nothing to restore
            if self.controllers.contains_key(parent)
                && let Err(error) = self.restore_parent(parent)
            {
                tracing::warn!(target: targets::FACTORY, ?parent, %error, "could not restore parent outside click");
            }
        }
        tracing::debug!(target: targets::FACTORY, count = dropped.len(), "pruned controllers");
        dropped
    }
}

#[cfg(test)]
mod tests {
    use twyg_core::Document;

    use super::*;
    use crate::config::TwygConfig;
    use crate::controller::ControllerState;
    use crate::template::TemplateRegistry;

    /// `div > (span > p, p)`
    fn nested(traversal: Traversal) -> (Twyg, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        doc.append_child(doc.root(), outer).unwrap();
        let span = doc.create_element("span");
        doc.append_child(outer, span).unwrap();
        let buried = doc.create_element("p");
        doc.append_child(span, buried).unwrap();
        let direct = doc.create_element("p");
        doc.append_child(outer, direct).unwrap();
        let config = TwygConfig::default().with_traversal(traversal);
        (Twyg::new(doc, TemplateRegistry::with_builtin_templates(), config), outer, buried, direct)
    }

    #[test]
    fn descendants_traversal_finds_buried_nodes() {
        let (mut twyg, outer, buried, direct) = nested(Traversal::Descendants);
        let root = twyg.attach(outer, &ControllerOptions::new()).unwrap().unwrap();

        let buried = twyg.controller_for(buried).unwrap();
        let direct = twyg.controller_for(direct).unwrap();
        assert_eq!(twyg.children(root).unwrap(), &[buried, direct]);
        assert_eq!(twyg.parent(buried).unwrap(), Some(root));
    }

    #[test]
    fn direct_children_traversal_skips_buried_nodes() {
        let (mut twyg, outer, buried, direct) = nested(Traversal::DirectChildren);
        let root = twyg.attach(outer, &ControllerOptions::new()).unwrap().unwrap();

        assert_eq!(twyg.controller_for(buried), None);
        let direct = twyg.controller_for(direct).unwrap();
        assert_eq!(twyg.children(root).unwrap(), &[direct]);
    }

    #[test]
    fn reinitialize_keeps_existing_and_adds_new() {
        let (mut twyg, outer, _, direct) = nested(Traversal::Descendants);
        let root = twyg.attach(outer, &ControllerOptions::new()).unwrap().unwrap();
        let before = twyg.children(root).unwrap().to_vec();

        let appended = twyg.document_mut().create_element("p");
        twyg.document_mut().append_child(outer, appended).unwrap();
        twyg.initialize_children(root).unwrap();

        let after = twyg.children(root).unwrap().to_vec();
        assert_eq!(after.len(), 3);
        assert_eq!(&after[..2], before.as_slice());
        assert_eq!(twyg.controller_for(appended), Some(after[2]));
        assert_eq!(twyg.controller_for(direct), Some(after[1]));
    }

    #[test]
    fn removed_nodes_are_pruned() {
        let (mut twyg, outer, _, direct) = nested(Traversal::Descendants);
        let root = twyg.attach(outer, &ControllerOptions::new()).unwrap().unwrap();
        let direct_id = twyg.controller_for(direct).unwrap();
        twyg.edit(root).unwrap();
        twyg.edit(direct_id).unwrap();
        assert!(!twyg.is_outside_click_bound(root).unwrap());

        twyg.document_mut().remove(direct).unwrap();
        assert_eq!(twyg.prune(), vec![direct_id]);

        assert_eq!(twyg.children(root).unwrap().len(), 1);
        assert_eq!(twyg.controller_count(), 2);
        assert!(twyg.is_outside_click_bound(root).unwrap());
        assert_eq!(twyg.state(root).unwrap(), ControllerState::Editing);
    }

    #[test]
    fn auto_init_reads_options() {
        let mut doc = Document::new();
        let first = doc.create_element("div");
        doc.set_attribute(first, "data-twyg-init", r#"{"autoActivate": true}"#).unwrap();
        doc.append_child(doc.root(), first).unwrap();
        let second = doc.create_element("div");
        doc.set_attribute(second, "data-twyg-init", "{not json").unwrap();
        doc.append_child(doc.root(), second).unwrap();
        let inner = doc.create_element("div");
        doc.set_attribute(inner, "data-twyg-init", "").unwrap();
        doc.append_child(first, inner).unwrap();

        let mut twyg = Twyg::new(doc, TemplateRegistry::with_builtin_templates(), TwygConfig::default());
        let attached = twyg.auto_init().unwrap();

        // `inner` was built as a child of `first`
        assert_eq!(attached.len(), 2);
        assert_eq!(twyg.state(attached[0]).unwrap(), ControllerState::Active);
        assert_eq!(twyg.state(attached[1]).unwrap(), ControllerState::Inactive);
        let inner = twyg.controller_for(inner).unwrap();
        assert_eq!(twyg.parent(inner).unwrap(), Some(attached[0]));
    }
}
