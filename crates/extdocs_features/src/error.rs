//! Feature resolution error types.

use thiserror::Error;

/// Errors that can occur while resolving features.
#[derive(Debug, Error)]
pub enum FeaturesError {
    /// A source file could not be read.
    #[error("File system error: {0}")]
    FileSystem(#[from] extdocs_fs::FileSystemError),

    /// The object store failed.
    #[error("Cache error: {0}")]
    Cache(#[from] extdocs_cache::CacheError),

    /// A source document is not valid JSON or not shaped like a feature file.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A dependency is not of the form `<family>:<name>`.
    #[error("Invalid dependency '{0}': expected '<api|manifest|permission>:<name>'")]
    InvalidDependency(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FeaturesError {
    /// Creates a malformed document error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument(message.into())
    }

    /// Creates an invalid dependency error.
    pub fn invalid_dependency(dependency: impl Into<String>) -> Self {
        Self::InvalidDependency(dependency.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Prefixes a malformed document error with the document path.
    pub(crate) fn in_document(self, path: &str) -> Self {
        match self {
            Self::MalformedDocument(message) => {
                Self::MalformedDocument(format!("{}: {}", path, message))
            }
            other => other,
        }
    }
}
