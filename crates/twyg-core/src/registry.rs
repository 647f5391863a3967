//! Node-to-controller registry.
//!
//! Every document node carries at most one controller. The registry is the
//! single place that records which controller owns a node, so creation,
//! lookup and cleanup all go through it.

use std::collections::HashMap;

use slotmap::new_key_type;

use crate::dom::{Document, NodeId};
use crate::error::RegistryError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a controller.
    pub struct ControllerId;
}

/// Maps document nodes to the controller bound to them.
#[derive(Debug, Default, Clone)]
pub struct NodeRegistry {
    entries: HashMap<NodeId, ControllerId>,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a controller to a node.
    ///
    /// Fails if the node already has a controller; the existing binding is
    /// left untouched.
    pub fn register(&mut self, node: NodeId, controller: ControllerId) -> Result<(), RegistryError> {
        if let Some(&existing) = self.entries.get(&node) {
            return Err(RegistryError::AlreadyAttached { node, existing });
        }
        self.entries.insert(node, controller);
        tracing::trace!(target: targets::REGISTRY, ?node, ?controller, "registered controller");
        Ok(())
    }

    /// The controller bound to a node, if any.
    pub fn controller_for(&self, node: NodeId) -> Option<ControllerId> {
        self.entries.get(&node).copied()
    }

    /// Whether a node has a controller.
    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    /// Drop the binding for a node, returning the controller it pointed at.
    pub fn forget(&mut self, node: NodeId) -> Option<ControllerId> {
        self.entries.remove(&node)
    }

    /// Number of bound nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no nodes are bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all bindings in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, ControllerId)> + '_ {
        self.entries.iter().map(|(&node, &controller)| (node, controller))
    }

    /// Drop bindings whose nodes no longer exist in the document.
    ///
    /// Returns the controllers that lost their node.
    pub fn retain_live(&mut self, document: &Document) -> Vec<ControllerId> {
        let mut dropped = Vec::new();
        self.entries.retain(|&node, &mut controller| {
            let live = document.contains_node(node);
            if !live {
                dropped.push(controller);
            }
            live
        });
        if !dropped.is_empty() {
            tracing::debug!(target: targets::REGISTRY, count = dropped.len(), "pruned stale bindings");
        }
        dropped
    }
}
