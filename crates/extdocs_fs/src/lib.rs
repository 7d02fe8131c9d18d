//! # extdocs_fs
//!
//! Read-only access to the versioned source tree the documentation is built from.
//!
//! Every backend answers two questions about a `/`-separated path relative to
//! the tree root:
//!
//! 1. **`read_single`**: the raw bytes of the file
//! 2. **`stat`**: an opaque version string that changes whenever the file does
//!
//! Caches key their entries on the version, so a backend must never report the
//! same version for different content.

mod error;
mod local;
mod memory;

pub use error::FileSystemError;
pub use local::LocalFileSystem;
pub use memory::MemoryFileSystem;

/// A versioned, read-only file source.
pub trait FileSystem: Send + Sync {
    /// Reads the whole file at `path`.
    fn read_single(&self, path: &str) -> Result<Vec<u8>, FileSystemError>;

    /// Returns the current version of the file at `path`.
    fn stat(&self, path: &str) -> Result<String, FileSystemError>;

    /// Reads the file at `path` as UTF-8 text.
    fn read_to_string(&self, path: &str) -> Result<String, FileSystemError> {
        let bytes = self.read_single(path)?;
        String::from_utf8(bytes).map_err(|e| FileSystemError::invalid_utf8(path, e.to_string()))
    }
}
