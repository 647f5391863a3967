//! Error types for the Twyg coordinator.

use std::path::PathBuf;

use twyg_core::{ControllerId, DomError, RegistryError};
use twyg_style::StyleError;

/// Result type alias for Twyg operations.
pub type Result<T> = std::result::Result<T, TwygError>;

/// Errors that can occur in Twyg.
///
/// "Nothing to do" situations (no template matches, node already attached,
/// exit on a permanent-edit controller) are reported through return values,
/// never through this type.
#[derive(Debug, thiserror::Error)]
pub enum TwygError {
    /// The controller ID is unknown or its node was removed.
    #[error("Invalid or removed controller {0:?}")]
    InvalidController(ControllerId),

    /// A document operation failed.
    #[error(transparent)]
    Dom(#[from] DomError),

    /// A node registry invariant was violated.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A template selector could not be parsed.
    #[error(transparent)]
    Style(#[from] StyleError),

    /// Markup was not well-formed XML.
    #[error("Markup parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Markup was well-formed XML but not a usable fragment.
    #[error("Invalid markup: {0}")]
    Markup(String),

    /// Controller options JSON could not be parsed.
    #[error("Invalid controller options: {0}")]
    Options(#[from] serde_json::Error),

    /// Configuration TOML could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration could not be written as TOML.
    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Configuration file could not be read.
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl TwygError {
    /// Create a markup error.
    pub fn markup(message: impl Into<String>) -> Self {
        Self::Markup(message.into())
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
