//! Cache Statistics Module
//!
//! Tracks cache counters: hits, misses, evictions and revalidations.

use serde::Serialize;

// == Cache Stats ==
/// Process-wide cache counters.
///
/// Every counter except `size` and `tags` only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Instrumented reads that found a fresh entry
    pub hits: u64,
    /// Instrumented reads that found nothing, or only a stale entry
    pub misses: u64,
    /// Entries removed by key, path or tag invalidation (not expiry, not clear)
    pub evictions: u64,
    /// Producer re-invocations for keys that already had an entry
    pub revalidations: u64,
    /// Current number of entries in the cache
    pub size: usize,
    /// Distinct tags carried by live entries
    pub tags: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been recorded.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Evictions ==
    /// Adds `count` removed entries to the eviction counter.
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_revalidation(&mut self) {
        self.revalidations += 1;
    }

    // == Update Entry Count ==
    pub fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    pub fn set_tags(&mut self, tags: usize) {
        self.tags = tags;
    }
}
