//! Cache entry types.

use serde::{Deserialize, Serialize};

/// A cached value together with the source version it was compiled from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Version of the source file, as reported by `FileSystem::stat`.
    pub version: String,

    /// The compiled value.
    pub value: T,
}

impl<T> CacheEntry<T> {
    /// Creates a new cache entry.
    pub fn new(version: String, value: T) -> Self {
        Self { version, value }
    }

    /// Checks if this cache entry is valid for the given source version.
    pub fn is_valid(&self, version: &str) -> bool {
        self.version == version
    }
}
