//! Twyg - click-to-edit activation for nested editable regions.
//!
//! A [`Twyg`] coordinator owns a [`Document`] and builds a tree of
//! controllers over the nodes its templates claim. Each controller moves
//! between inactive, active and editing as the page is clicked:
//!
//! - clicking an active node starts editing it and exposes its children
//! - clicking outside an editing node makes it exit
//! - at most one controller of a sibling group edits at a time
//!
//! State is reported to the page through marker classes on the nodes and
//! through [`Twyg::state_changed`].
//!
//! # Example
//!
//! ```
//! use twyg::{ControllerOptions, ControllerState, TemplateRegistry, Twyg, TwygConfig, parse_markup};
//! use twyg_core::Document;
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! let room = parse_markup(&mut doc, root, "<div><p>hello</p><p>world</p></div>").unwrap()[0];
//! let lines = doc.children(room).unwrap().to_vec();
//!
//! let mut twyg = Twyg::new(doc, TemplateRegistry::with_builtin_templates(), TwygConfig::default());
//! let room = twyg.attach(room, &ControllerOptions::new().auto_activate(true)).unwrap().unwrap();
//!
//! twyg.click(lines[0]).unwrap(); // the room starts editing
//! twyg.click(lines[0]).unwrap(); // then the paragraph
//! let hello = twyg.controller_for(lines[0]).unwrap();
//! assert_eq!(twyg.state(hello).unwrap(), ControllerState::Editing);
//! assert_eq!(twyg.document().attribute(lines[0], "contenteditable"), Some("true"));
//! assert_eq!(twyg.state(room).unwrap(), ControllerState::Editing);
//! ```

pub mod config;
pub mod controller;
pub mod debug;
pub mod dispatch;
pub mod error;
pub mod markup;
pub mod options;
pub mod outside_click;
pub mod shared;
pub mod template;

mod factory;
mod tree;
mod twyg;

pub use config::{Traversal, TwygConfig};
pub use controller::{Controller, ControllerState, EditOutcome, ExitOutcome, StateChange};
pub use debug::ControllerTreeDebug;
pub use dispatch::ClickOutcome;
pub use error::{Result, TwygError};
pub use markup::parse_markup;
pub use options::{ControllerOptions, TemplateOptions};
pub use outside_click::{ListenerId, OutsideClick};
pub use shared::SharedTwyg;
pub use template::{BUILTIN_PRIORITY, DEFAULT_PRIORITY, Template, TemplateRegistry};
pub use twyg::Twyg;
pub use twyg_core::{ControllerId, Document, NodeId};

static_assertions::assert_impl_all!(Twyg: Send);
