//! CSS-like selectors for Twyg.
//!
//! Templates decide which document nodes they claim with selectors. This
//! crate parses selector text and matches it against a [`twyg_core::Document`]:
//!
//! - **Selectors**: Type, universal, class, ID, attribute and pseudo-class selectors
//! - **Combinators**: Descendant, child and both sibling combinators
//! - **Lists**: Comma-separated alternatives such as `*, .twyg`
//!
//! # Example
//!
//! ```
//! use twyg_core::Document;
//! use twyg_style::prelude::*;
//!
//! let mut doc = Document::new();
//! let input = doc.create_element("div");
//! doc.add_class(input, "chat-input").unwrap();
//! doc.append_child(doc.root(), input).unwrap();
//! let paragraph = doc.create_element("p");
//! doc.append_child(input, paragraph).unwrap();
//!
//! let list = SelectorList::parse(".chat-input > p").unwrap();
//! assert!(SelectorMatcher::matches_list(&list, &doc, paragraph));
//! ```

pub mod parser;
pub mod selector;

mod error;

pub use error::{Result, StyleError};
pub use parser::parse_selector_list;

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::parser::parse_selector_list;
    pub use crate::selector::{
        AttributeSelector, Combinator, NthExpr, PseudoClass, Selector, SelectorList, SelectorMatcher,
        SelectorPart, TypeSelector,
    };
    pub use crate::{Result, StyleError};
}
