//! Keyed object stores.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::CacheError;

/// A keyed store of values.
///
/// Implementations serialize access internally; callers share a store
/// through `Arc` without extra locking.
pub trait ObjectStore<T>: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<T>, CacheError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: T) -> Result<(), CacheError>;

    /// Removes the value stored under `key`.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// An [`ObjectStore`] living for the lifetime of the process.
#[derive(Debug)]
pub struct MemoryObjectStore<T> {
    entries: RwLock<HashMap<String, T>>,
}

impl<T> MemoryObjectStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for MemoryObjectStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObjectStore<T> for MemoryObjectStore<T>
where
    T: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Result<Option<T>, CacheError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: T) -> Result<(), CacheError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoreFile<T> {
    version: String,
    entries: HashMap<String, T>,
}

/// An [`ObjectStore`] persisted to a JSON file.
///
/// The file is loaded on first access and rewritten on every change. A file
/// written under a different store version is ignored.
#[derive(Debug)]
pub struct FileObjectStore<T> {
    path: PathBuf,
    version: String,
    entries: RwLock<Option<HashMap<String, T>>>,
}

impl<T> FileObjectStore<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Creates a store backed by the file at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Store file location; parent directories are created on write
    /// * `version` - Entries written under any other version are discarded
    pub fn new(path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            entries: RwLock::new(None),
        }
    }

    /// Returns the store file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, T>, CacheError> {
        if !self.path.exists() {
            debug!("No object store found at {}", self.path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read(&self.path)?;
        let file: StoreFile<T> = serde_json::from_slice(&content)
            .map_err(|e| CacheError::corrupted(format!("{}: {}", self.path.display(), e)))?;

        if file.version != self.version {
            debug!(
                "Discarding object store {} written under version {}",
                self.path.display(),
                file.version
            );
            return Ok(HashMap::new());
        }

        info!(
            "Loaded {} object store entries from {}",
            file.entries.len(),
            self.path.display()
        );
        Ok(file.entries)
    }

    fn save(&self, entries: &HashMap<String, T>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = StoreFile {
            version: self.version.clone(),
            entries: entries.clone(),
        };
        let bytes =
            serde_json::to_vec(&file).map_err(|e| CacheError::Serialization(e.to_string()))?;

        // Readers must never observe a half-written store file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| CacheError::write(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| CacheError::write(e.to_string()))?;

        debug!(
            "Saved {} object store entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut HashMap<String, T>) -> Result<R, CacheError>,
    ) -> Result<R, CacheError> {
        let mut guard = self.entries.write();
        if guard.is_none() {
            *guard = Some(self.load()?);
        }
        match guard.as_mut() {
            Some(entries) => f(entries),
            None => Err(CacheError::corrupted("object store failed to load")),
        }
    }
}

impl<T> ObjectStore<T> for FileObjectStore<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    fn get(&self, key: &str) -> Result<Option<T>, CacheError> {
        if let Some(entries) = self.entries.read().as_ref() {
            return Ok(entries.get(key).cloned());
        }
        self.with_entries(|entries| Ok(entries.get(key).cloned()))
    }

    fn set(&self, key: &str, value: T) -> Result<(), CacheError> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value);
            self.save(entries)
        })
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.with_entries(|entries| {
            if entries.remove(key).is_some() {
                self.save(entries)?;
            }
            Ok(())
        })
    }
}

/// Creates object stores, either all in memory or all persisted under one
/// directory.
#[derive(Debug, Clone)]
pub struct ObjectStoreCreator {
    root: Option<PathBuf>,
    version: String,
}

impl ObjectStoreCreator {
    /// Creates stores that live only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            root: None,
            version: String::new(),
        }
    }

    /// Creates stores persisted under `root`.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory holding one JSON file per store
    /// * `version` - Store version; changing it invalidates every store
    pub fn persistent(root: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            root: Some(root.into()),
            version: version.into(),
        }
    }

    /// Returns the root directory of persistent stores.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Returns where the store for `namespace` and `category` is persisted.
    pub fn store_path(
        &self,
        namespace: &str,
        category: &str,
    ) -> Result<Option<PathBuf>, CacheError> {
        for segment in [namespace, category] {
            if !is_safe_segment(segment) {
                return Err(CacheError::invalid_key(segment));
            }
        }
        Ok(self
            .root
            .as_ref()
            .map(|root| root.join(format!("{}.{}.json", namespace, category))))
    }

    /// Creates the store for `namespace` and `category`.
    pub fn create<T>(
        &self,
        namespace: &str,
        category: &str,
    ) -> Result<Arc<dyn ObjectStore<T>>, CacheError>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        match self.store_path(namespace, category)? {
            Some(path) => Ok(Arc::new(FileObjectStore::new(path, self.version.clone()))),
            None => Ok(Arc::new(MemoryObjectStore::new())),
        }
    }

    /// Removes every persisted store.
    pub fn clear(&self) -> Result<(), CacheError> {
        if let Some(root) = &self.root
            && root.exists()
        {
            fs::remove_dir_all(root)?;
            info!("Removed object stores under {}", root.display());
        }
        Ok(())
    }
}

fn is_safe_segment(s: &str) -> bool {
    let path = Path::new(s);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) => c == s,
        _ => false,
    }
}
