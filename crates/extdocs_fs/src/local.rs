//! Source tree backed by a local directory.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::{debug, warn};

use crate::{FileSystem, FileSystemError};

/// A [`FileSystem`] rooted at a directory on disk.
///
/// Versions are derived from the modification time and length of the file,
/// so no content is read to answer [`FileSystem::stat`].
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    /// Creates a file system rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a tree-relative path to a location under the root.
    ///
    /// # Security
    ///
    /// - Rejects absolute paths
    /// - Rejects paths containing `..`
    fn resolve(&self, path: &str) -> Result<PathBuf, FileSystemError> {
        let p = Path::new(path);

        if p.is_absolute() || p.has_root() {
            warn!("Rejecting absolute source path: {}", path);
            return Err(FileSystemError::invalid_path(path));
        }

        if p.components().any(|c| matches!(c, Component::ParentDir)) {
            warn!("Rejecting source path containing '..': {}", path);
            return Err(FileSystemError::invalid_path(path));
        }

        Ok(self.root.join(p))
    }
}

impl FileSystem for LocalFileSystem {
    fn read_single(&self, path: &str) -> Result<Vec<u8>, FileSystemError> {
        let full = self.resolve(path)?;
        debug!("Reading {}", full.display());
        fs::read(&full).map_err(|e| FileSystemError::io(path, e))
    }

    fn stat(&self, path: &str) -> Result<String, FileSystemError> {
        let full = self.resolve(path)?;
        let metadata = fs::metadata(&full).map_err(|e| FileSystemError::io(path, e))?;
        if !metadata.is_file() {
            return Err(FileSystemError::not_found(path));
        }

        let modified = metadata
            .modified()
            .map_err(|e| FileSystemError::io(path, e))?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);

        Ok(format!("{}-{}", modified, metadata.len()))
    }
}
