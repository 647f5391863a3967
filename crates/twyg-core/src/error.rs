//! Error types for Twyg core operations.

use crate::dom::NodeId;
use crate::registry::ControllerId;

/// Errors that can occur during document operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The node ID is invalid or the node has been removed.
    #[error("Invalid or removed node {0:?}")]
    InvalidNode(NodeId),
    /// Attempted to append a node into its own subtree.
    #[error("Cannot append {child:?} below its own descendant {parent:?}")]
    CircularParentage {
        /// The node that was being appended.
        child: NodeId,
        /// The requested new parent.
        parent: NodeId,
    },
    /// The document root cannot be moved or removed.
    #[error("The document root cannot be moved or removed")]
    RootImmutable,
}

/// Result type for document operations.
pub type DomResult<T> = std::result::Result<T, DomError>;

/// Errors raised by the node registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The node already has a controller attached.
    #[error("Node {node:?} is already bound to controller {existing:?}")]
    AlreadyAttached {
        /// The node that was being registered.
        node: NodeId,
        /// The controller already bound to that node.
        existing: ControllerId,
    },
}
