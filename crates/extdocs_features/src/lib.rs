//! # extdocs_features
//!
//! Resolution of the API, manifest and permission features that the
//! extension documentation is generated from.
//!
//! This crate provides:
//! - Normalization of raw `_*_features.json` documents into feature families
//! - Per-family source caches that merge extra declaration files on top
//! - The `FeaturesBundle`, which annotates API features with the platforms
//!   they are available on, derived from their dependencies
//! - Configuration loading
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use extdocs_cache::{CompiledCacheFactory, ObjectStoreCreator};
//! use extdocs_features::FeaturesBundle;
//! use extdocs_fs::LocalFileSystem;
//!
//! let fs = Arc::new(LocalFileSystem::new("/path/to/src"));
//! let bundle = FeaturesBundle::new(
//!     fs,
//!     &CompiledCacheFactory::new(),
//!     &ObjectStoreCreator::in_memory(),
//! )?;
//!
//! for (name, feature) in bundle.api_features()? {
//!     println!("{}: {:?}", name, feature.platforms);
//! }
//! ```

mod bundle;
mod config;
mod dependency;
mod error;
mod feature;
pub mod json;
pub mod normalize;
pub mod paths;
mod platforms;
mod source_cache;

pub use bundle::{API_FEATURES_KEY, FeaturesBundle};
pub use config::{BundleConfig, FeatureSources, SourcePaths};
pub use dependency::{DependencyRef, FamilyKind};
pub use error::FeaturesError;
pub use feature::{Feature, FeatureFamily, Platform};
pub use source_cache::FeaturesCache;
