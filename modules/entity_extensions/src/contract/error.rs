//! Contract error types for entity extensions
//!
//! These errors are transport-agnostic and used for inter-module communication.

/// Entity extension errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtensionError {
    /// The backing store rejected a read or write
    #[error("Storage error: {message}")]
    Storage {
        /// Message of the underlying failure
        message: String,
    },

    /// A value could not be cast to its declared kind (reject policy only)
    #[error("Validation error: {message}")]
    Validation {
        /// Validation error message
        message: String,
    },

    /// A locale or scope key did not resolve (reject policy only)
    #[error("Unknown junction value '{value}' for table {table}")]
    UnknownJunction {
        /// Storage table the value was addressed to
        table: String,
        /// Raw junction value as received
        value: String,
    },

    /// The engine was used before being initialized
    #[error("Internal error")]
    Internal,
}

impl ExtensionError {
    pub fn storage(error: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: error.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
