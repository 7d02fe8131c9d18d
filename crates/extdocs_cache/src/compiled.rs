//! Memoization of values compiled from source files.

use std::collections::HashMap;
use std::sync::Arc;

use extdocs_fs::{FileSystem, FileSystemError};
use parking_lot::RwLock;
use tracing::debug;

use crate::CacheEntry;

type CompileFn<T, E> = dyn Fn(&str, &[u8]) -> Result<T, E> + Send + Sync;

/// Creates [`CompiledFileCache`] instances.
#[derive(Debug, Clone)]
pub struct CompiledCacheFactory {
    enabled: bool,
}

impl CompiledCacheFactory {
    /// Creates a factory whose caches memoize compiled values.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Creates a factory whose caches recompile on every request.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Returns whether created caches memoize values.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wraps `compile` in a cache reading from `fs`.
    ///
    /// # Arguments
    ///
    /// * `fs` - Source the files are read from
    /// * `compile` - Turns a path and its raw bytes into the cached value
    /// * `category` - Label used in log output
    pub fn create<T, E, F>(
        &self,
        fs: Arc<dyn FileSystem>,
        compile: F,
        category: impl Into<String>,
    ) -> CompiledFileCache<T, E>
    where
        F: Fn(&str, &[u8]) -> Result<T, E> + Send + Sync + 'static,
    {
        CompiledFileCache {
            fs,
            compile: Box::new(compile),
            category: category.into(),
            entries: RwLock::new(HashMap::new()),
            enabled: self.enabled,
        }
    }
}

impl Default for CompiledCacheFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// A lazily filled, version-checked cache of values compiled from files.
///
/// An entry is reused while `FileSystem::stat` keeps reporting the version it
/// was compiled from. The lock is not held while compiling, so a compile
/// function may itself read through other caches.
pub struct CompiledFileCache<T, E> {
    fs: Arc<dyn FileSystem>,
    compile: Box<CompileFn<T, E>>,
    category: String,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    enabled: bool,
}

impl<T, E> CompiledFileCache<T, E>
where
    T: Clone,
    E: From<FileSystemError>,
{
    /// Returns the compiled value for `path`, compiling it if the cached entry
    /// is missing or stale.
    pub fn get_from_file(&self, path: &str) -> Result<T, E> {
        let version = self.fs.stat(path)?;

        if self.enabled
            && let Some(entry) = self.entries.read().get(path)
            && entry.is_valid(&version)
        {
            debug!("[{}] cache hit for {} at {}", self.category, path, version);
            return Ok(entry.value.clone());
        }

        debug!("[{}] compiling {} at {}", self.category, path, version);
        let bytes = self.fs.read_single(path)?;
        let value = (self.compile)(path, &bytes)?;

        if self.enabled {
            self.entries
                .write()
                .insert(path.to_string(), CacheEntry::new(version, value.clone()));
        }

        Ok(value)
    }
}
