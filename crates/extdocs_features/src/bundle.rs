//! Access to the API, manifest and permission feature families.

use std::sync::Arc;

use extdocs_cache::{CompiledCacheFactory, ObjectStore, ObjectStoreCreator};
use extdocs_fs::FileSystem;
use parking_lot::ReentrantMutex;
use tracing::{debug, info, warn};

use crate::platforms::{FamilySource, annotate_platforms};
use crate::{FamilyKind, FeatureFamily, FeatureSources, FeaturesCache, FeaturesError};

/// Memo key of the annotated API family.
pub const API_FEATURES_KEY: &str = "api_features";

const STORE_NAMESPACE: &str = "features_bundle";
const STORE_CATEGORY: &str = "features";

/// Provides the three feature families.
///
/// Manifest and permission features are served straight from their source
/// caches. API features are additionally annotated with the platforms they
/// are available on and memoized in an object store.
///
/// # Reentrancy
///
/// While annotating, the unannotated API family is already stored under
/// [`API_FEATURES_KEY`]. A call to [`FeaturesBundle::api_features`] made from
/// the annotating thread returns that snapshot. Calls from other threads wait
/// until the annotated family is stored.
pub struct FeaturesBundle {
    api_cache: FeaturesCache,
    manifest_cache: FeaturesCache,
    permission_cache: FeaturesCache,
    object_store: Arc<dyn ObjectStore<FeatureFamily>>,
    api_lock: ReentrantMutex<()>,
}

impl FeaturesBundle {
    /// Creates a bundle reading the default source tree locations.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        factory: &CompiledCacheFactory,
        creator: &ObjectStoreCreator,
    ) -> Result<Self, FeaturesError> {
        Self::with_sources(fs, factory, creator, &FeatureSources::default())
    }

    /// Creates a bundle reading the documents named by `sources`.
    pub fn with_sources(
        fs: Arc<dyn FileSystem>,
        factory: &CompiledCacheFactory,
        creator: &ObjectStoreCreator,
        sources: &FeatureSources,
    ) -> Result<Self, FeaturesError> {
        let object_store = creator.create(STORE_NAMESPACE, STORE_CATEGORY)?;
        Ok(Self::with_object_store(fs, factory, object_store, sources))
    }

    /// Creates a bundle memoizing API features in `object_store`.
    pub fn with_object_store(
        fs: Arc<dyn FileSystem>,
        factory: &CompiledCacheFactory,
        object_store: Arc<dyn ObjectStore<FeatureFamily>>,
        sources: &FeatureSources,
    ) -> Self {
        Self {
            api_cache: FeaturesCache::new(Arc::clone(&fs), factory, &sources.api_features),
            manifest_cache: FeaturesCache::new(
                Arc::clone(&fs),
                factory,
                &sources.manifest_features,
            ),
            permission_cache: FeaturesCache::new(fs, factory, &sources.permission_features),
            object_store,
            api_lock: ReentrantMutex::new(()),
        }
    }

    /// Returns the permission features.
    pub fn permission_features(&self) -> Result<FeatureFamily, FeaturesError> {
        self.permission_cache.get_features()
    }

    /// Returns the manifest features.
    pub fn manifest_features(&self) -> Result<FeatureFamily, FeaturesError> {
        self.manifest_cache.get_features()
    }

    /// Returns the API features, each annotated with its platforms.
    pub fn api_features(&self) -> Result<FeatureFamily, FeaturesError> {
        let _guard = self.api_lock.lock();

        if let Some(features) = self.object_store.get(API_FEATURES_KEY)? {
            debug!("Serving API features from memo");
            return Ok(features);
        }

        let mut features = self.api_cache.get_features()?;
        self.object_store.set(API_FEATURES_KEY, features.clone())?;
        debug!("Stored {} unannotated API features", features.len());

        if let Err(e) = annotate_platforms(&mut features, self) {
            if let Err(delete_err) = self.object_store.delete(API_FEATURES_KEY) {
                warn!("Failed to discard unannotated API features: {}", delete_err);
            }
            return Err(e);
        }

        self.object_store.set(API_FEATURES_KEY, features.clone())?;
        info!("Annotated {} API features", features.len());

        Ok(features)
    }

    /// Returns the features of `kind`.
    pub fn features(&self, kind: FamilyKind) -> Result<FeatureFamily, FeaturesError> {
        match kind {
            FamilyKind::Api => self.api_features(),
            FamilyKind::Manifest => self.manifest_features(),
            FamilyKind::Permission => self.permission_features(),
        }
    }
}

impl FamilySource for FeaturesBundle {
    fn family(&self, kind: FamilyKind) -> Result<FeatureFamily, FeaturesError> {
        self.features(kind)
    }
}
