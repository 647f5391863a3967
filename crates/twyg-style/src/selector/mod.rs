//! CSS-like selector types and matching.

mod matcher;
mod types;

pub use matcher::{SelectorMatcher, SiblingInfo};
pub use types::*;
