//! In-memory source tree.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::{FileSystem, FileSystemError};

#[derive(Debug, Clone)]
struct MemoryFile {
    content: Vec<u8>,
    version: u64,
}

/// A [`FileSystem`] holding its files in memory.
///
/// Every write assigns a fresh version, unique across the whole tree. Reads
/// and stats are counted, which lets callers verify that a cache layer really
/// avoided the source.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<HashMap<String, MemoryFile>>,
    next_version: AtomicU64,
    reads: AtomicUsize,
    stats: AtomicUsize,
}

impl MemoryFileSystem {
    /// Creates an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a file system pre-populated with `files`.
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        let fs = Self::new();
        for (path, content) in files {
            fs.write(path, content);
        }
        fs
    }

    /// Writes `content` to `path`, creating or replacing the file.
    pub fn write(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        self.files.write().insert(
            path.into(),
            MemoryFile {
                content: content.into(),
                version,
            },
        );
    }

    /// Removes the file at `path`.
    pub fn remove(&self, path: &str) {
        self.files.write().remove(path);
    }

    /// Number of `read_single` calls since creation or the last reset.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `stat` calls since creation or the last reset.
    pub fn stat_count(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }

    /// Resets the read and stat counters.
    pub fn reset_counts(&self) {
        self.reads.store(0, Ordering::SeqCst);
        self.stats.store(0, Ordering::SeqCst);
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_single(&self, path: &str) -> Result<Vec<u8>, FileSystemError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.files
            .read()
            .get(path)
            .map(|f| f.content.clone())
            .ok_or_else(|| FileSystemError::not_found(path))
    }

    fn stat(&self, path: &str) -> Result<String, FileSystemError> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.files
            .read()
            .get(path)
            .map(|f| f.version.to_string())
            .ok_or_else(|| FileSystemError::not_found(path))
    }
}
