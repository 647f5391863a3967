//! Outside-click detection.
//!
//! Binding a node installs two listeners: a node-level one that records
//! "this node (or something inside it) was clicked" and a document-level one
//! that fires the node's handler when a click reached the document without
//! passing through the node. The document listener clears the flag on every
//! run, so a self click only shields the click it belongs to.
//!
//! Each binding owns exactly one document listener. Rebinding first removes
//! the previous listener, so a node never fires twice for one click.

use std::collections::HashMap;

use slotmap::{SlotMap, new_key_type};
use twyg_core::NodeId;
use twyg_core::logging::targets;

new_key_type! {
    /// Identifies one document-level listener.
    pub struct ListenerId;
}

#[derive(Debug, Clone)]
struct Binding<H> {
    listener: ListenerId,
    handler: H,
    hit: bool,
}

/// Per-node outside-click bindings carrying a handler of type `H`.
#[derive(Debug, Clone)]
pub struct OutsideClick<H> {
    bindings: HashMap<NodeId, Binding<H>>,
    /// Document listeners in installation order.
    listeners: SlotMap<ListenerId, NodeId>,
    order: Vec<ListenerId>,
}

impl<H> Default for OutsideClick<H> {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
            listeners: SlotMap::with_key(),
            order: Vec::new(),
        }
    }
}

impl<H: Copy> OutsideClick<H> {
    /// Create an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to clicks outside `node`, replacing any previous binding.
    pub fn bind(&mut self, node: NodeId, handler: H) -> ListenerId {
        self.unbind(node);
        let listener = self.listeners.insert(node);
        self.order.push(listener);
        self.bindings.insert(
            node,
            Binding {
                listener,
                handler,
                hit: false,
            },
        );
        tracing::trace!(target: targets::OUTSIDE_CLICK, ?node, ?listener, "bound");
        listener
    }

    /// Remove both listeners of `node`. Returns the handler that was bound.
    pub fn unbind(&mut self, node: NodeId) -> Option<H> {
        let binding = self.bindings.remove(&node)?;
        self.listeners.remove(binding.listener);
        self.order.retain(|&listener| listener != binding.listener);
        tracing::trace!(target: targets::OUTSIDE_CLICK, ?node, listener = ?binding.listener, "unbound");
        Some(binding.handler)
    }

    /// Whether `node` currently has a binding.
    pub fn is_bound(&self, node: NodeId) -> bool {
        self.bindings.contains_key(&node)
    }

    /// The handler bound to `node`.
    pub fn handler(&self, node: NodeId) -> Option<H> {
        self.bindings.get(&node).map(|binding| binding.handler)
    }

    /// Node-level listener: a click passed through `node`.
    pub fn note_self_click(&mut self, node: NodeId) {
        if let Some(binding) = self.bindings.get_mut(&node) {
            binding.hit = true;
        }
    }

    /// The document listeners currently installed, in installation order.
    pub fn snapshot(&self) -> Vec<ListenerId> {
        self.order.clone()
    }

    /// Run one document listener.
    ///
    /// Returns the node and handler to notify when the click was outside.
    /// Listeners removed since the snapshot was taken do nothing.
    pub fn fire(&mut self, listener: ListenerId) -> Option<(NodeId, H)> {
        let node = *self.listeners.get(listener)?;
        let binding = self.bindings.get_mut(&node)?;
        let outside = !binding.hit;
        binding.hit = false;
        if outside {
            tracing::trace!(target: targets::OUTSIDE_CLICK, ?node, ?listener, "outside click");
            Some((node, binding.handler))
        } else {
            None
        }
    }

    /// Run every document listener for a click that reached the document.
    ///
    /// Handlers are only collected, so nothing can rebind while this runs.
    pub fn document_click(&mut self) -> Vec<(NodeId, H)> {
        self.snapshot()
            .into_iter()
            .filter_map(|listener| self.fire(listener))
            .collect()
    }

    /// Number of bound nodes.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no node is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drop bindings for nodes rejected by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        let stale: Vec<NodeId> = self.bindings.keys().copied().filter(|&node| !keep(node)).collect();
        for node in stale {
            self.unbind(node);
        }
    }
}
