//! Error types for the cache store.

use thiserror::Error;

/// Errors that can occur during cache store operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// No value is stored under the key (or nothing was removed on delete).
    #[error("Key not found: {0}")]
    NotFound(String),

    /// The backend could not be reached or rejected the command.
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    /// The value could not be encoded, or the stored payload could not be decoded.
    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
