//! Administrative Surface
//!
//! Read-only statistics plus the mutating operations (clear all, invalidate by
//! tag, key or path, sweep) used by the dashboard and the revalidation
//! endpoint. Authorization belongs to whatever exposes these operations; the
//! cache itself has no notion of it.

use tracing::info;

use crate::cache::{CacheInfo, SharedCache};
use crate::models::{ClearResponse, InvalidateResponse, StatsResponse};

// == Cache Admin ==
/// Administrative handle over a shared cache.
///
/// Works on the store directly, bypassing boundary trigger logic.
#[derive(Debug)]
pub struct CacheAdmin<T> {
    cache: SharedCache<T>,
}

impl<T> Clone for CacheAdmin<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<T> CacheAdmin<T> {
    pub fn new(cache: SharedCache<T>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &SharedCache<T> {
        &self.cache
    }

    // == Stats ==
    /// Snapshot of the counters; mutates nothing.
    pub async fn stats(&self) -> StatsResponse {
        StatsResponse::from(self.cache.read().await.stats())
    }

    // == Clear All ==
    /// Removes every entry. Idempotent.
    pub async fn clear_all(&self) -> ClearResponse {
        let removed = self.cache.write().await.clear();
        info!("Cache cleared: {} keys", removed);
        ClearResponse::new()
    }

    // == Invalidate Tag ==
    /// Removes every entry carrying `tag`; a tag matching nothing reports zero.
    pub async fn invalidate_tag(&self, tag: &str) -> InvalidateResponse {
        let count = self.cache.write().await.delete_by_tag(tag);
        info!("Cache invalidated by tag '{}': {} keys", tag, count);
        InvalidateResponse::new(format!("Cache tag \"{}\" invalidated successfully", tag), count)
    }

    // == Invalidate Key ==
    pub async fn invalidate_key(&self, key: &str) -> InvalidateResponse {
        let removed = self.cache.write().await.delete(key);
        info!("Cache invalidated key '{}': removed={}", key, removed);
        InvalidateResponse::new(
            format!("Cache key \"{}\" invalidated successfully", key),
            usize::from(removed),
        )
    }

    // == Invalidate Path ==
    /// Removes the entry for `path` and every `path?<query>` variant.
    pub async fn invalidate_path(&self, path: &str) -> InvalidateResponse {
        let count = self.cache.write().await.delete_path(path);
        info!("Cache invalidated by path '{}': {} keys", path, count);
        InvalidateResponse::new(format!("Cache path \"{}\" invalidated successfully", path), count)
    }

    // == Sweep ==
    /// Drops all stale entries.
    pub async fn sweep(&self) -> InvalidateResponse {
        let count = self.cache.write().await.sweep_stale();
        info!("Cache sweep: {} stale entries removed", count);
        InvalidateResponse::new("Stale entries removed", count)
    }

    // == Introspection ==
    pub async fn keys(&self) -> Vec<String> {
        self.cache.read().await.keys()
    }

    pub async fn info(&self, key: &str) -> CacheInfo {
        self.cache.read().await.info(key)
    }
}
