//! Contacts client error types.

use thiserror::Error;

/// Errors raised by a [`LocalStorage`](crate::LocalStorage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The write would exceed the storage quota.
    #[error("Storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },

    /// The key cannot be stored by this backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by a contacts source.
#[derive(Debug, Error)]
pub enum ContactsError {
    /// A required field is missing or empty.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The target contact does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Local persistence failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),

    /// The request never got a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The response body was not what was expected.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Client configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for contacts operations.
pub type ContactsResult<T> = Result<T, ContactsError>;
