//! # extdocs_cache
//!
//! Caching layers used while building documentation from a source tree.
//!
//! ## Cache Strategy
//!
//! 1. **Compiled-file cache**: memoizes the result of parsing a file, keyed by
//!    path and invalidated when the file's version changes
//! 2. **Object store**: a keyed store for derived values that must survive
//!    across requests, and across process lifetimes when persisted to disk
//!
//! ## Storage
//!
//! Persistent object stores are written as JSON documents tagged with a store
//! version. A store whose version differs from the expected one is treated as
//! empty.

mod compiled;
mod entry;
mod error;
mod object_store;

pub use compiled::{CompiledCacheFactory, CompiledFileCache};
pub use entry::CacheEntry;
pub use error::CacheError;
pub use object_store::{FileObjectStore, MemoryObjectStore, ObjectStore, ObjectStoreCreator};
