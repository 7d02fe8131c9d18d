//! Bundle configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use extdocs_cache::{CompiledCacheFactory, ObjectStoreCreator};
use extdocs_fs::FileSystem;
use jsonc_parser::ParseOptions;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};

use crate::{FamilyKind, FeaturesError, paths};

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Documents one feature family is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePaths {
    /// Primary features document. `None` means the family is empty.
    pub path: Option<String>,

    /// Declaration documents merged over the primary one, in order.
    #[serde(default)]
    pub extra: Vec<String>,
}

impl SourcePaths {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            extra: Vec::new(),
        }
    }

    /// A family with no source documents.
    pub fn none() -> Self {
        Self {
            path: None,
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, path: impl Into<String>) -> Self {
        self.extra.push(path.into());
        self
    }
}

/// Source documents of all three families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSources {
    #[serde(default = "default_api_features")]
    pub api_features: SourcePaths,

    #[serde(default = "default_manifest_features")]
    pub manifest_features: SourcePaths,

    #[serde(default = "default_permission_features")]
    pub permission_features: SourcePaths,
}

fn default_api_features() -> SourcePaths {
    SourcePaths::new(paths::API_FEATURES)
}

fn default_manifest_features() -> SourcePaths {
    SourcePaths::new(paths::MANIFEST_FEATURES).with_extra(paths::MANIFEST_DECLARATIONS)
}

fn default_permission_features() -> SourcePaths {
    SourcePaths::new(paths::PERMISSION_FEATURES).with_extra(paths::PERMISSION_DECLARATIONS)
}

impl FeatureSources {
    /// Returns the documents of `kind`.
    pub fn get(&self, kind: FamilyKind) -> &SourcePaths {
        match kind {
            FamilyKind::Api => &self.api_features,
            FamilyKind::Manifest => &self.manifest_features,
            FamilyKind::Permission => &self.permission_features,
        }
    }

    /// Returns every configured document, primaries before extras.
    pub fn documents(&self) -> impl Iterator<Item = &str> + '_ {
        FamilyKind::ALL
            .into_iter()
            .flat_map(move |kind| {
                let paths = self.get(kind);
                paths.path.iter().chain(paths.extra.iter())
            })
            .map(String::as_str)
    }

    /// Returns a digest of the current versions of every configured document.
    ///
    /// A missing document contributes a fixed marker, so the digest also
    /// changes when a document appears or disappears.
    pub fn source_version(&self, fs: &dyn FileSystem) -> Result<String, FeaturesError> {
        let mut hasher = blake3::Hasher::new();
        for path in self.documents() {
            let version = match fs.stat(path) {
                Ok(version) => version,
                Err(e) if e.is_not_found() => "missing".to_string(),
                Err(e) => return Err(e.into()),
            };
            hasher.update(path.as_bytes());
            hasher.update(b"\0");
            hasher.update(version.as_bytes());
            hasher.update(b"\n");
        }
        Ok(hasher.finalize().to_hex().to_string())
    }
}

impl Default for FeatureSources {
    fn default() -> Self {
        Self {
            api_features: default_api_features(),
            manifest_features: default_manifest_features(),
            permission_features: default_permission_features(),
        }
    }
}

/// Configuration of a features bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Where each family is read from.
    #[serde(flatten)]
    pub sources: FeatureSources,

    /// Whether to enable caching.
    #[serde(default = "default_cache")]
    pub cache: bool,

    /// Directory of the persistent object stores, relative to `base_dir`.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_cache() -> bool {
    true
}

fn default_cache_dir() -> String {
    ".extdocs-cache".to_string()
}

impl BundleConfig {
    /// File names searched for, in order.
    pub const CONFIG_FILES: [&'static str; 2] = [".extdocs.jsonc", ".extdocs.json"];

    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            sources: FeatureSources::default(),
            cache: true,
            cache_dir: default_cache_dir(),
            base_dir: None,
        }
    }

    /// Returns the first configuration file found in `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        Self::CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FeaturesError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FeaturesError::config(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_json(&content)?;

        if let Some(parent) = path.parent() {
            config.base_dir = Some(parent.to_path_buf());
        }

        Ok(config)
    }

    /// Parses configuration from JSON with comments, validating it against
    /// the configuration schema.
    pub fn from_json(json: &str) -> Result<Self, FeaturesError> {
        let value = jsonc_parser::parse_to_serde_value(json, &ParseOptions::default())
            .map_err(|e| FeaturesError::config(format!("Invalid JSON: {}", e)))?
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

        let schema = CONFIG_SCHEMA.get_or_init(|| {
            let schema_json: serde_json::Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded config schema");
            Validator::new(&schema_json).expect("Invalid config schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            let error_msg = format!("{} at {}", e, e.instance_path());
            return Err(FeaturesError::config(format!(
                "Config validation failed: {}",
                error_msg
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| FeaturesError::config(format!("Invalid config: {}", e)))
    }

    /// Computes a hash of the configuration.
    pub fn hash(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Returns the object store directory, resolved against `base_dir`.
    pub fn cache_path(&self) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(&self.cache_dir),
            None => PathBuf::from(&self.cache_dir),
        }
    }

    /// Returns the object store version for the documents in `fs`.
    ///
    /// Memoized families are keyed on both the configuration and the source
    /// documents, so a change to either is never answered from a stale store.
    pub fn store_version(&self, fs: &dyn FileSystem) -> Result<String, FeaturesError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.hash().as_bytes());
        hasher.update(self.sources.source_version(fs)?.as_bytes());
        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Returns the creator for the bundle's object stores over `fs`.
    pub fn object_store_creator(
        &self,
        fs: &dyn FileSystem,
    ) -> Result<ObjectStoreCreator, FeaturesError> {
        if self.cache {
            Ok(ObjectStoreCreator::persistent(
                self.cache_path(),
                self.store_version(fs)?,
            ))
        } else {
            Ok(ObjectStoreCreator::in_memory())
        }
    }

    /// Returns the factory for the bundle's source caches.
    pub fn compiled_cache_factory(&self) -> CompiledCacheFactory {
        if self.cache {
            CompiledCacheFactory::new()
        } else {
            CompiledCacheFactory::disabled()
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self::new()
    }
}
