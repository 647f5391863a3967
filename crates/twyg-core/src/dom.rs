//! DOM-like document model for Twyg.
//!
//! Provides an arena-backed element tree with:
//! - Stable node identifiers via [`NodeId`]
//! - Ordered parent-child relationships (document order)
//! - Class lists and attributes used as visual markers
//! - Tree traversal in document order
//!
//! The document is the surface that host markup is loaded into and that
//! controllers report their state onto. Nothing in it knows about controllers;
//! the mapping from nodes to controllers lives in [`crate::NodeRegistry`].
//!
//! # Example
//!
//! ```
//! use twyg_core::Document;
//!
//! let mut doc = Document::new();
//! let stream = doc.create_element("div");
//! doc.add_class(stream, "chat-stream").unwrap();
//! doc.append_child(doc.root(), stream).unwrap();
//!
//! let row = doc.create_element("P");
//! doc.append_child(stream, row).unwrap();
//!
//! assert_eq!(doc.tag(row).unwrap(), "p");
//! assert_eq!(doc.parent(row).unwrap(), Some(stream));
//! assert!(doc.contains(stream, row));
//! ```

use std::cmp::Ordering;

use slotmap::{SlotMap, new_key_type};

use crate::error::{DomError, DomResult};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a node in a [`Document`].
    ///
    /// `NodeId`s stay valid while the node is part of the arena and become
    /// invalid once the node is removed with [`Document::remove`].
    pub struct NodeId;
}

impl NodeId {
    /// Convert the NodeId to a raw u64 value.
    ///
    /// Useful when a host needs to stash the identity somewhere numeric.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create a NodeId from a raw u64 value.
    ///
    /// This does not check that the node exists in any document.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Tag name given to the implicit document root.
pub const ROOT_TAG: &str = "#document";

/// Internal data stored for each node.
#[derive(Debug, Clone)]
struct NodeData {
    /// Lowercase tag name.
    tag: String,
    /// Ordered, de-duplicated class list.
    classes: Vec<String>,
    /// Attributes in insertion order (excluding `class`).
    attributes: Vec<(String, String)>,
    /// Text content directly owned by this element.
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attributes: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An element tree with an implicit root node.
///
/// Elements are created detached and become part of the document once
/// appended below [`Document::root`] (directly or through ancestors).
#[derive(Debug, Clone)]
pub struct Document {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
}

impl Document {
    /// Create an empty document containing only the root node.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::new(ROOT_TAG));
        Self { nodes, root }
    }

    /// The implicit root node. Clicks that reach it are "document" clicks.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element with the given tag name.
    pub fn create_element(&mut self, tag: impl AsRef<str>) -> NodeId {
        let id = self.nodes.insert(NodeData::new(tag.as_ref()));
        tracing::trace!(target: targets::DOM, ?id, tag = tag.as_ref(), "created element");
        id
    }

    /// Check if a node exists in the arena.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes in the arena, including the root and detached nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the node is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    fn data(&self, id: NodeId) -> DomResult<&NodeData> {
        self.nodes.get(id).ok_or(DomError::InvalidNode(id))
    }

    fn data_mut(&mut self, id: NodeId) -> DomResult<&mut NodeData> {
        self.nodes.get_mut(id).ok_or(DomError::InvalidNode(id))
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append `child` as the last child of `parent`.
    ///
    /// The child is detached from its previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.data(parent)?;
        self.data(child)?;
        if child == self.root {
            return Err(DomError::RootImmutable);
        }
        if self.contains(child, parent) {
            return Err(DomError::CircularParentage { child, parent });
        }

        self.unlink(child);
        self.data_mut(child)?.parent = Some(parent);
        self.data_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detach a node (and its subtree) from its parent without removing it.
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        self.data(id)?;
        if id == self.root {
            return Err(DomError::RootImmutable);
        }
        self.unlink(id);
        Ok(())
    }

    fn unlink(&mut self, id: NodeId) {
        let old_parent = self.nodes.get_mut(id).and_then(|d| d.parent.take());
        if let Some(parent_id) = old_parent {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.children.retain(|&child| child != id);
            }
        }
    }

    /// Remove a node and its whole subtree from the arena.
    ///
    /// Returns every removed node, the given node first.
    pub fn remove(&mut self, id: NodeId) -> DomResult<Vec<NodeId>> {
        let mut removed = vec![id];
        removed.extend(self.descendants(id)?);
        self.detach(id)?;
        for node in &removed {
            self.nodes.remove(*node);
        }
        tracing::trace!(target: targets::DOM, ?id, count = removed.len(), "removed subtree");
        Ok(removed)
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> DomResult<Option<NodeId>> {
        self.data(id).map(|d| d.parent)
    }

    /// Get the children of a node in document order.
    pub fn children(&self, id: NodeId) -> DomResult<&[NodeId]> {
        self.data(id).map(|d| d.children.as_slice())
    }

    /// Get all ancestors from the immediate parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> DomResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut current = self.data(id)?.parent;
        while let Some(current_id) = current {
            result.push(current_id);
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// Get all descendants in document (pre-)order, excluding the node itself.
    pub fn descendants(&self, id: NodeId) -> DomResult<Vec<NodeId>> {
        let mut result = Vec::new();
        self.descendants_recursive(id, &mut result)?;
        Ok(result)
    }

    fn descendants_recursive(&self, id: NodeId, result: &mut Vec<NodeId>) -> DomResult<()> {
        for &child in &self.data(id)?.children {
            result.push(child);
            self.descendants_recursive(child, result)?;
        }
        Ok(())
    }

    /// Whether `node` is `ancestor` itself or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(current_id) = current {
            if current_id == ancestor {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    /// Index of a node among its parent's children.
    pub fn sibling_index(&self, id: NodeId) -> DomResult<Option<usize>> {
        let Some(parent) = self.data(id)?.parent else {
            return Ok(None);
        };
        Ok(self
            .children(parent)?
            .iter()
            .position(|&child| child == id))
    }

    /// Number of children of the node's parent (including the node).
    pub fn sibling_count(&self, id: NodeId) -> DomResult<usize> {
        match self.data(id)?.parent {
            Some(parent) => Ok(self.children(parent)?.len()),
            None => Ok(1),
        }
    }

    /// Preceding siblings, nearest first.
    pub fn previous_siblings(&self, id: NodeId) -> DomResult<Vec<NodeId>> {
        let Some(parent) = self.data(id)?.parent else {
            return Ok(Vec::new());
        };
        let children = self.children(parent)?;
        let index = children.iter().position(|&c| c == id).unwrap_or(0);
        Ok(children[..index].iter().rev().copied().collect())
    }

    /// Compare two nodes by document order.
    ///
    /// An ancestor sorts before its descendants. Nodes in unrelated
    /// (detached) trees compare by their raw ids.
    pub fn compare_document_position(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let path_a = self.path_from_top(a);
        let path_b = self.path_from_top(b);

        if path_a.first() != path_b.first() {
            return a.as_raw().cmp(&b.as_raw());
        }

        for (left, right) in path_a.iter().zip(path_b.iter()) {
            if left != right {
                let left_index = self.sibling_index(*left).ok().flatten().unwrap_or(0);
                let right_index = self.sibling_index(*right).ok().flatten().unwrap_or(0);
                return left_index.cmp(&right_index);
            }
        }
        path_a.len().cmp(&path_b.len())
    }

    fn path_from_top(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = self.ancestors(id).unwrap_or_default();
        path.reverse();
        path.push(id);
        path
    }

    // =========================================================================
    // Element data
    // =========================================================================

    /// Lowercase tag name of the node.
    pub fn tag(&self, id: NodeId) -> DomResult<&str> {
        self.data(id).map(|d| d.tag.as_str())
    }

    /// The value of the `id` attribute, if any.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.attribute(id, "id")
    }

    /// The node's class list.
    pub fn classes(&self, id: NodeId) -> DomResult<&[String]> {
        self.data(id).map(|d| d.classes.as_slice())
    }

    /// Whether the node carries the class. False for unknown nodes.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|d| d.classes.iter().any(|c| c == class))
    }

    /// Add a class. Returns `false` if it was already present.
    pub fn add_class(&mut self, id: NodeId, class: impl Into<String>) -> DomResult<bool> {
        let class = class.into();
        let data = self.data_mut(id)?;
        if data.classes.contains(&class) {
            return Ok(false);
        }
        data.classes.push(class);
        Ok(true)
    }

    /// Remove a class. Returns `false` if it was not present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> DomResult<bool> {
        let data = self.data_mut(id)?;
        let before = data.classes.len();
        data.classes.retain(|c| c != class);
        Ok(data.classes.len() != before)
    }

    /// Read an attribute. The class list is not exposed through this method.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|d| {
            d.attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        })
    }

    /// Set an attribute, replacing any previous value.
    ///
    /// Setting `class` replaces the class list with the whitespace-separated
    /// names in `value`.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> DomResult<()> {
        let name = name.into();
        let value = value.into();
        let data = self.data_mut(id)?;

        if name == "class" {
            data.classes.clear();
            for class in value.split_whitespace() {
                if !data.classes.iter().any(|c| c == class) {
                    data.classes.push(class.to_string());
                }
            }
            return Ok(());
        }

        match data.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => data.attributes.push((name, value)),
        }
        Ok(())
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        let data = self.data_mut(id)?;
        let position = data.attributes.iter().position(|(key, _)| key == name);
        Ok(position.map(|index| data.attributes.remove(index).1))
    }

    /// Iterate over the node's attributes in insertion order.
    pub fn attributes(&self, id: NodeId) -> DomResult<impl Iterator<Item = (&str, &str)>> {
        Ok(self
            .data(id)?
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str())))
    }

    /// Read a `data-<key>` attribute.
    pub fn data_attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.attribute(id, &format!("data-{key}"))
    }

    /// Text content directly owned by the node.
    pub fn text(&self, id: NodeId) -> DomResult<&str> {
        self.data(id).map(|d| d.text.as_str())
    }

    /// Append to the node's own text content.
    pub fn append_text(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        self.data_mut(id)?.text.push_str(text);
        Ok(())
    }

    /// All connected nodes carrying the attribute, in document order.
    pub fn nodes_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .unwrap_or_default()
            .into_iter()
            .filter(|&id| self.attribute(id, name).is_some())
            .collect()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
