//! Error types for model and generator operations.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by model parsing and traffic generation.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// A message type name outside the supported set.
    #[error("unsupported message type '{name}'")]
    UnsupportedType {
        /// The offending type name.
        name: String,
    },

    /// The generator was constructed without any contacts.
    #[error("generator requires at least one contact")]
    NoContacts,
}

impl CoreError {
    /// Creates an unsupported-type error.
    pub fn unsupported_type(name: impl Into<String>) -> Self {
        Self::UnsupportedType { name: name.into() }
    }
}
