//! Behavior of the features bundle against in-memory and on-disk sources.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::sync::{Arc, OnceLock, Weak};
use std::thread;

use extdocs_cache::{CacheError, CompiledCacheFactory, ObjectStore, ObjectStoreCreator};
use extdocs_features::{
    API_FEATURES_KEY, FamilyKind, FeatureFamily, FeatureSources, FeaturesBundle, FeaturesError,
    Platform, SourcePaths,
};
use extdocs_fs::{FileSystem, FileSystemError, LocalFileSystem, MemoryFileSystem};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const API: &str = "api/_api_features.json";
const MANIFEST: &str = "api/_manifest_features.json";
const MANIFEST_JSON: &str = "templates/manifest.json";
const PERMISSION: &str = "api/_permission_features.json";
const PERMISSIONS_JSON: &str = "templates/permissions.json";

fn sources() -> FeatureSources {
    FeatureSources {
        api_features: SourcePaths::new(API),
        manifest_features: SourcePaths::new(MANIFEST).with_extra(MANIFEST_JSON),
        permission_features: SourcePaths::new(PERMISSION).with_extra(PERMISSIONS_JSON),
    }
}

fn source_tree(api: &str) -> Arc<MemoryFileSystem> {
    Arc::new(MemoryFileSystem::with_files([
        (API, api),
        (
            MANIFEST,
            r#"{
                "app": { "channel": "stable", "extension_types": ["platform_app"] },
                "background": { "channel": "stable", "extension_types": ["extension"] }
            }"#,
        ),
        (MANIFEST_JSON, r#"{ "background": { "example": {} } }"#),
        (
            PERMISSION,
            r#"// Copyright header.
            {
                "tabs": { "channel": "stable", "extension_types": ["extension"] },
                "storage": { "channel": "stable", "extension_types": "all" },
                "experimental": { "channel": "trunk", "extension_types": "all" }
            }"#,
        ),
        (PERMISSIONS_JSON, "{}"),
    ]))
}

fn bundle(fs: Arc<MemoryFileSystem>) -> FeaturesBundle {
    FeaturesBundle::with_sources(
        fs,
        &CompiledCacheFactory::new(),
        &ObjectStoreCreator::in_memory(),
        &sources(),
    )
    .unwrap()
}

fn set(platforms: &[Platform]) -> Option<BTreeSet<Platform>> {
    Some(platforms.iter().copied().collect())
}

/// Records every write made to the memo.
#[derive(Default)]
struct RecordingStore {
    entries: Mutex<HashMap<String, FeatureFamily>>,
    writes: Mutex<Vec<FeatureFamily>>,
}

impl ObjectStore<FeatureFamily> for RecordingStore {
    fn get(&self, key: &str) -> Result<Option<FeatureFamily>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: FeatureFamily) -> Result<(), CacheError> {
        self.writes.lock().push(value.clone());
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

mod platform_annotation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn feature_without_dependencies_is_available_everywhere() {
        let bundle = bundle(source_tree(r#"{ "runtime": { "channel": "stable" } }"#));

        let features = bundle.api_features().unwrap();

        assert_eq!(features["runtime"].platforms, set(&Platform::ALL));
    }

    #[test]
    fn platforms_are_union_of_dependencies() {
        let bundle = bundle(source_tree(
            r#"{
                "app.window": { "dependencies": ["manifest:app"] },
                "tabs": { "dependencies": ["permission:tabs"] },
                "both": { "dependencies": ["manifest:app", "permission:tabs"] },
                "storage": { "dependencies": ["permission:storage"] }
            }"#,
        ));

        let features = bundle.api_features().unwrap();

        assert_eq!(features["app.window"].platforms, set(&[Platform::Apps]));
        assert_eq!(features["tabs"].platforms, set(&[Platform::Extensions]));
        assert_eq!(features["both"].platforms, set(&Platform::ALL));
        assert_eq!(features["storage"].platforms, set(&Platform::ALL));
    }

    #[test]
    fn unresolved_dependency_leaves_platforms_unset() {
        let bundle = bundle(source_tree(
            r#"{
                "experimental": { "dependencies": ["permission:experimental"] },
                "ghost": { "dependencies": ["permission:tabs", "manifest:ghost"] }
            }"#,
        ));

        let features = bundle.api_features().unwrap();

        assert_eq!(features["experimental"].platforms, None);
        assert_eq!(features["ghost"].platforms, None);
    }

    #[test]
    fn api_dependency_uses_annotated_platforms() {
        let bundle = bundle(source_tree(
            r#"{
                "tabs": { "dependencies": ["permission:tabs"] },
                "windows": { "dependencies": ["api:tabs"] }
            }"#,
        ));

        let features = bundle.api_features().unwrap();

        assert_eq!(features["windows"].platforms, set(&[Platform::Extensions]));
    }

    #[test]
    fn mutual_dependency_terminates() {
        let bundle = bundle(source_tree(
            r#"{
                "a": { "dependencies": ["api:b"] },
                "b": { "dependencies": ["api:a", "manifest:app"] }
            }"#,
        ));

        let features = bundle.api_features().unwrap();

        assert_eq!(features["a"].platforms, set(&[Platform::Apps]));
        assert_eq!(features["b"].platforms, set(&[Platform::Apps]));
    }

    #[test]
    fn result_does_not_depend_on_name_order() {
        let forward = bundle(source_tree(
            r#"{
                "a_dependent": { "dependencies": ["api:z_base"] },
                "z_base": { "dependencies": ["manifest:app"] }
            }"#,
        ))
        .api_features()
        .unwrap();
        let backward = bundle(source_tree(
            r#"{
                "a_base": { "dependencies": ["manifest:app"] },
                "z_dependent": { "dependencies": ["api:a_base"] }
            }"#,
        ))
        .api_features()
        .unwrap();

        assert_eq!(forward["a_dependent"].platforms, set(&[Platform::Apps]));
        assert_eq!(
            forward["a_dependent"].platforms,
            backward["z_dependent"].platforms
        );
    }

    #[test]
    fn malformed_dependency_is_an_error() {
        let bundle = bundle(source_tree(r#"{ "tabs": { "dependencies": ["tabs"] } }"#));

        let err = bundle.api_features().unwrap_err();

        assert!(matches!(err, FeaturesError::InvalidDependency(_)));
    }
}

mod memoization {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn second_call_reads_nothing() {
        let fs = source_tree(r#"{ "tabs": { "dependencies": ["permission:tabs"] } }"#);
        let bundle = bundle(fs.clone());

        let first = bundle.api_features().unwrap();
        fs.reset_counts();
        let second = bundle.api_features().unwrap();

        assert_eq!(first, second);
        assert_eq!(fs.read_count(), 0);
        assert_eq!(fs.stat_count(), 0);
    }

    #[test]
    fn memo_is_written_twice_on_first_call() {
        let fs = source_tree(r#"{ "tabs": { "dependencies": ["permission:tabs"] } }"#);
        let store = Arc::new(RecordingStore::default());
        let bundle = FeaturesBundle::with_object_store(
            fs,
            &CompiledCacheFactory::new(),
            store.clone(),
            &sources(),
        );

        let features = bundle.api_features().unwrap();
        bundle.api_features().unwrap();

        let writes = store.writes.lock();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0]["tabs"].platforms, None);
        assert_eq!(writes[1], features);
        assert_eq!(
            store.entries.lock().get(API_FEATURES_KEY),
            Some(&features)
        );
    }

    #[test]
    fn concurrent_callers_compute_once() {
        let fs = source_tree(
            r#"{
                "tabs": { "dependencies": ["permission:tabs"] },
                "app.window": { "dependencies": ["manifest:app"] }
            }"#,
        );
        let store = Arc::new(RecordingStore::default());
        let bundle = Arc::new(FeaturesBundle::with_object_store(
            fs,
            &CompiledCacheFactory::new(),
            store.clone(),
            &sources(),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bundle = Arc::clone(&bundle);
                thread::spawn(move || bundle.api_features().unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(store.writes.lock().len(), 2);
        for result in &results {
            assert_eq!(result["tabs"].platforms, set(&[Platform::Extensions]));
            assert_eq!(result, &results[0]);
        }
    }

    #[test]
    fn persistent_memo_survives_bundle() {
        let cache_dir = tempdir().unwrap();
        let creator = ObjectStoreCreator::persistent(cache_dir.path(), "v1");
        let api = r#"{ "tabs": { "dependencies": ["permission:tabs"] } }"#;

        let first = FeaturesBundle::with_sources(
            source_tree(api),
            &CompiledCacheFactory::new(),
            &creator,
            &sources(),
        )
        .unwrap()
        .api_features()
        .unwrap();

        let fs = source_tree(api);
        let second = FeaturesBundle::with_sources(
            fs.clone(),
            &CompiledCacheFactory::new(),
            &creator,
            &sources(),
        )
        .unwrap()
        .api_features()
        .unwrap();

        assert_eq!(first, second);
        assert_eq!(fs.read_count(), 0);
    }

    #[test]
    fn changed_store_version_recomputes() {
        let cache_dir = tempdir().unwrap();
        let api = r#"{ "tabs": { "dependencies": ["permission:tabs"] } }"#;

        FeaturesBundle::with_sources(
            source_tree(api),
            &CompiledCacheFactory::new(),
            &ObjectStoreCreator::persistent(cache_dir.path(), "v1"),
            &sources(),
        )
        .unwrap()
        .api_features()
        .unwrap();

        let fs = source_tree(api);
        FeaturesBundle::with_sources(
            fs.clone(),
            &CompiledCacheFactory::new(),
            &ObjectStoreCreator::persistent(cache_dir.path(), "v2"),
            &sources(),
        )
        .unwrap()
        .api_features()
        .unwrap();

        assert!(fs.read_count() > 0);
    }

    #[test]
    fn changed_source_invalidates_family() {
        let fs = source_tree("{}");
        let bundle = bundle(fs.clone());

        assert!(bundle.manifest_features().unwrap().contains_key("app"));

        fs.write(MANIFEST, r#"{ "kiosk_enabled": {} }"#);
        let features = bundle.manifest_features().unwrap();

        assert!(!features.contains_key("app"));
        assert!(features.contains_key("kiosk_enabled"));
    }
}

mod sources {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn unset_primary_path_yields_empty_family() {
        let fs = source_tree("{}");
        let mut sources = sources();
        sources.permission_features = SourcePaths::none();
        let bundle = FeaturesBundle::with_sources(
            fs,
            &CompiledCacheFactory::new(),
            &ObjectStoreCreator::in_memory(),
            &sources,
        )
        .unwrap();

        assert!(bundle.permission_features().unwrap().is_empty());
        assert!(bundle.features(FamilyKind::Permission).unwrap().is_empty());
    }

    #[test]
    fn declarations_merge_over_features() {
        let fs = source_tree("{}");
        fs.write(MANIFEST, r#"{ "tabs": { "desc": "x" } }"#);
        fs.write(
            MANIFEST_JSON,
            r#"{ "tabs": { "platforms_hint": "y" }, "windows": { "desc": "z" } }"#,
        );

        let features = bundle(fs).manifest_features().unwrap();

        let names: Vec<_> = features.keys().cloned().collect();
        assert_eq!(names, vec!["tabs".to_string(), "windows".to_string()]);
        assert_eq!(features["tabs"].attribute("desc"), Some(&json!("x")));
        assert_eq!(features["tabs"].attribute("platforms_hint"), Some(&json!("y")));
        assert_eq!(features["windows"].attribute("desc"), Some(&json!("z")));
    }

    #[test]
    fn trunk_features_are_excluded() {
        let features = bundle(source_tree("{}")).permission_features().unwrap();

        assert!(!features.contains_key("experimental"));
        assert_eq!(features["storage"].platforms, set(&Platform::ALL));
    }

    #[test]
    fn missing_source_propagates() {
        let fs = source_tree("{}");
        fs.remove(API);

        let err = bundle(fs).api_features().unwrap_err();

        assert!(matches!(
            err,
            FeaturesError::FileSystem(FileSystemError::NotFound(_))
        ));
    }

    #[test]
    fn reads_source_tree_from_disk() {
        let root = tempdir().unwrap();
        for (path, content) in [
            (API, r#"{ "app.runtime": { "dependencies": ["manifest:app"] } }"#),
            (MANIFEST, r#"{ "app": { "extension_types": ["platform_app"] } }"#),
            (MANIFEST_JSON, "{}"),
            (PERMISSION, "{}"),
            (PERMISSIONS_JSON, "{}"),
        ] {
            let full = root.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }

        let bundle = FeaturesBundle::with_sources(
            Arc::new(LocalFileSystem::new(root.path())),
            &CompiledCacheFactory::new(),
            &ObjectStoreCreator::in_memory(),
            &sources(),
        )
        .unwrap();

        let features = bundle.api_features().unwrap();
        assert_eq!(features["app.runtime"].platforms, set(&[Platform::Apps]));
    }
}

mod reentrancy {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Calls back into the bundle when the manifest features are read.
    struct ReentrantSource {
        inner: Arc<MemoryFileSystem>,
        bundle: OnceLock<Weak<FeaturesBundle>>,
        observed: Mutex<Option<FeatureFamily>>,
    }

    impl FileSystem for ReentrantSource {
        fn read_single(&self, path: &str) -> Result<Vec<u8>, FileSystemError> {
            if path == MANIFEST
                && let Some(bundle) = self.bundle.get().and_then(Weak::upgrade)
            {
                let snapshot = bundle
                    .api_features()
                    .map_err(|e| FileSystemError::invalid_path(e.to_string()))?;
                *self.observed.lock() = Some(snapshot);
            }
            self.inner.read_single(path)
        }

        fn stat(&self, path: &str) -> Result<String, FileSystemError> {
            self.inner.stat(path)
        }
    }

    #[test]
    fn reentrant_call_sees_unannotated_snapshot() {
        let source = Arc::new(ReentrantSource {
            inner: source_tree(r#"{ "app.window": { "dependencies": ["manifest:app"] } }"#),
            bundle: OnceLock::new(),
            observed: Mutex::new(None),
        });
        let bundle = Arc::new(
            FeaturesBundle::with_sources(
                source.clone(),
                &CompiledCacheFactory::new(),
                &ObjectStoreCreator::in_memory(),
                &sources(),
            )
            .unwrap(),
        );
        source.bundle.set(Arc::downgrade(&bundle)).unwrap();

        let features = bundle.api_features().unwrap();

        let observed = source.observed.lock().take().unwrap();
        assert!(observed.contains_key("app.window"));
        assert_eq!(observed["app.window"].platforms, None);
        assert_eq!(features["app.window"].platforms, set(&[Platform::Apps]));
    }
}
