//! Cache error types.

use thiserror::Error;

/// Errors that can occur in the cache system.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to write a store file.
    #[error("Failed to write cache: {0}")]
    WriteError(String),

    /// A store file could not be decoded.
    #[error("Corrupted cache: {0}")]
    Corrupted(String),

    /// A namespace or category is not usable as a store file name.
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    /// Creates a write error.
    pub fn write(message: impl Into<String>) -> Self {
        Self::WriteError(message.into())
    }

    /// Creates a corrupted cache error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }

    /// Creates an invalid key error.
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }
}
