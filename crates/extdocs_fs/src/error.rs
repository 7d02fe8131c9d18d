//! File system error types.

use thiserror::Error;

/// Errors returned by a [`FileSystem`](crate::FileSystem) backend.
#[derive(Debug, Error)]
pub enum FileSystemError {
    /// The path does not exist in the source tree.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The path is absolute or escapes the tree root.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The file is not valid UTF-8.
    #[error("File is not valid UTF-8: {path}: {message}")]
    InvalidUtf8 { path: String, message: String },

    /// I/O error.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FileSystemError {
    /// Creates a not-found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Creates an invalid UTF-8 error.
    pub fn invalid_utf8(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUtf8 {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wraps an I/O error, mapping `NotFound` to [`FileSystemError::NotFound`].
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Returns true if the error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
