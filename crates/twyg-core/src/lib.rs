//! Core systems for Twyg.
//!
//! This crate provides the foundation the Twyg controller tree is built on:
//!
//! - **Document**: An arena-backed element tree with classes and attributes
//! - **Node Registry**: The one-controller-per-node binding table
//! - **Signal/Slot System**: Synchronous change notification
//! - **Logging**: Tracing targets and tree dumps for debugging
//!
//! # Document Example
//!
//! ```
//! use twyg_core::{Document, NodeRegistry};
//!
//! let mut doc = Document::new();
//! let paragraph = doc.create_element("p");
//! doc.append_child(doc.root(), paragraph).unwrap();
//! doc.add_class(paragraph, "twyg-active").unwrap();
//!
//! assert!(doc.has_class(paragraph, "twyg-active"));
//! assert!(NodeRegistry::new().controller_for(paragraph).is_none());
//! ```

pub mod dom;
pub mod error;
pub mod logging;
pub mod registry;
pub mod signal;

pub use dom::{Document, NodeId, ROOT_TAG};
pub use error::{DomError, DomResult, RegistryError};
pub use logging::{DisplayDocument, DocumentTreeDebug, TreeFormatOptions, TreeStyle};
pub use registry::{ControllerId, NodeRegistry};
pub use signal::{ConnectionGuard, ConnectionId, Signal};

static_assertions::assert_impl_all!(Document: Send, Sync);
