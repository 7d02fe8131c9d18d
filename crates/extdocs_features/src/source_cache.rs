//! Per-family source caches.

use std::sync::Arc;

use extdocs_cache::{CompiledCacheFactory, CompiledFileCache};
use extdocs_fs::FileSystem;
use tracing::debug;

use crate::json::parse_json;
use crate::normalize::{merged_with, parse_features};
use crate::{FeatureFamily, FeaturesError, SourcePaths};

/// Reads one feature family from its source documents.
///
/// The family is compiled from the primary document and cached against that
/// document's version. Extra documents are merged on top, in order, each
/// time the primary document is compiled.
pub struct FeaturesCache {
    cache: CompiledFileCache<FeatureFamily, FeaturesError>,
    json_path: Option<String>,
}

impl FeaturesCache {
    /// Creates a cache for the documents named by `paths`.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        factory: &CompiledCacheFactory,
        paths: &SourcePaths,
    ) -> Self {
        let extra_paths = paths.extra.clone();
        let extra_fs = Arc::clone(&fs);

        let compile = move |path: &str, bytes: &[u8]| -> Result<FeatureFamily, FeaturesError> {
            let raw = parse_json(path, bytes)?;
            let mut features = parse_features(&raw).map_err(|e| e.in_document(path))?;

            for extra_path in &extra_paths {
                debug!("Merging {} into {}", extra_path, path);
                let bytes = extra_fs.read_single(extra_path)?;
                let raw = parse_json(extra_path, &bytes)?;
                let extra = parse_features(&raw).map_err(|e| e.in_document(extra_path))?;
                features = merged_with(extra, features);
            }

            Ok(features)
        };

        Self {
            cache: factory.create(fs, compile, "features"),
            json_path: paths.path.clone(),
        }
    }

    /// Returns the family, or an empty family when no primary document is
    /// configured.
    pub fn get_features(&self) -> Result<FeatureFamily, FeaturesError> {
        match &self.json_path {
            Some(path) => self.cache.get_from_file(path),
            None => Ok(FeatureFamily::new()),
        }
    }
}
