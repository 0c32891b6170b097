//! Cache Module
//!
//! In-memory application cache with duration parsing, tag invalidation,
//! revalidation-aware boundaries and a cacheable response wrapper.

mod boundary;
mod duration;
mod entry;
mod stats;
mod store;
mod tags;
mod wrap;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use boundary::{BoundaryState, BoundaryView, CacheBoundary, CacheOptions};
pub use duration::{parse_duration, Ttl, FORCE_CACHE, NO_STORE};
pub use entry::{current_timestamp_ms, tag_set, CacheEntry, CacheInfo};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use tags::TagIndex;
pub use wrap::{cache_control, cache_key_for, with_cache, CacheMetadata, Cached, WrapOptions};

// == Shared Handle ==
/// Process-wide cache handle.
///
/// Reads take the read lock, writes and instrumented reads take the write lock.
/// No lock is ever held while a producer runs.
pub type SharedCache<T> = Arc<RwLock<CacheStore<T>>>;

/// Creates an empty shared cache.
pub fn shared_cache<T>() -> SharedCache<T> {
    Arc::new(RwLock::new(CacheStore::new()))
}
