//! Error types for selector handling.

/// Result type alias for selector operations.
pub type Result<T> = std::result::Result<T, StyleError>;

/// Errors that can occur while parsing selectors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    /// Selector parsing error.
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector {
        /// The full selector text that failed to parse.
        selector: String,
        /// What went wrong.
        message: String,
    },
}

impl StyleError {
    /// Create a selector error.
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }
}
