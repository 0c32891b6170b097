//! Cache Store Module
//!
//! Main cache engine: a keyed map of entries, its tag index and the counters.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::cache::{CacheEntry, CacheInfo, CacheStats, TagIndex, Ttl};

// == Cache Store ==
/// Keyed store of cache entries.
///
/// There is no memory bound and no background expiry: stale entries stay until
/// they are overwritten, invalidated, cleared or swept by [`CacheStore::sweep_stale`].
/// None of the operations can fail.
#[derive(Debug)]
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Tag to keys index, mirrors the entries' tag sets
    tags: TagIndex,
    /// Performance statistics
    stats: CacheStats,
}

impl<T> Default for CacheStore<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            tags: TagIndex::new(),
            stats: CacheStats::new(),
        }
    }
}

impl<T> CacheStore<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Pure read: no counters, no staleness interpretation.
    pub fn get(&self, key: &str) -> Option<&CacheEntry<T>> {
        self.entries.get(key)
    }

    // == Is Stale ==
    /// Staleness predicate for an entry read from this store.
    pub fn is_stale(entry: &CacheEntry<T>) -> bool {
        entry.is_stale()
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// The expiry is computed from `ttl`; [`Ttl::Forever`] leaves it unset.
    pub fn set(&mut self, key: impl Into<String>, value: T, ttl: Ttl, tags: HashSet<String>) {
        let key = key.into();
        let entry = CacheEntry::new(value, ttl, tags);

        self.remove_entry(&key);
        self.tags.insert(&key, &entry.tags);
        self.entries.insert(key.clone(), entry);

        self.stats.set_size(self.entries.len());
        debug!("Cache set: {} (ttl {})", key, ttl);
    }

    // == Delete ==
    /// Removes the entry for `key`, returning whether one was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key).is_some();
        if removed {
            self.stats.record_evictions(1);
            self.stats.set_size(self.entries.len());
            debug!("Cache delete: {}", key);
        }
        removed
    }

    // == Delete By Tag ==
    /// Removes every entry carrying `tag`, returning how many were removed.
    pub fn delete_by_tag(&mut self, tag: &str) -> usize {
        let mut count = 0;
        for key in self.tags.keys_for(tag) {
            if self.remove_entry(&key).is_some() {
                count += 1;
            }
        }

        self.stats.record_evictions(count);
        self.stats.set_size(self.entries.len());
        debug!("Cache invalidated by tag '{}': {} keys", tag, count);
        count
    }

    // == Delete Path ==
    /// Removes the entry keyed `path` and every entry keyed `path?<query>`.
    pub fn delete_path(&mut self, path: &str) -> usize {
        let query_prefix = format!("{}?", path);
        let keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.as_str() == path || key.starts_with(&query_prefix))
            .cloned()
            .collect();

        for key in &keys {
            self.remove_entry(key);
        }

        self.stats.record_evictions(keys.len());
        self.stats.set_size(self.entries.len());
        debug!("Cache invalidated by path '{}': {} keys", path, keys.len());
        keys.len()
    }

    // == Sweep Stale ==
    /// Removes all stale entries, returning the number removed.
    ///
    /// Expiry is not an eviction, so the eviction counter is untouched.
    pub fn sweep_stale(&mut self) -> usize {
        let stale_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_stale())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale_keys {
            self.remove_entry(key);
        }

        self.stats.set_size(self.entries.len());
        stale_keys.len()
    }

    // == Clear ==
    /// Removes every entry, returning how many there were.
    ///
    /// A full clear is not counted as evictions.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.tags.clear();
        self.stats.set_size(0);
        debug!("Cache cleared: {} keys", count);
        count
    }

    // == Revalidation ==
    /// Counts one producer re-invocation for an already populated key.
    pub fn record_revalidation(&mut self) {
        self.stats.record_revalidation();
    }

    // == Stats ==
    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_size(self.entries.len());
        stats.set_tags(self.tag_count());
        stats
    }

    // == Introspection ==
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Describes the entry for `key` without touching the counters.
    pub fn info(&self, key: &str) -> CacheInfo {
        self.entries
            .get(key)
            .map(CacheEntry::info)
            .unwrap_or_else(CacheInfo::missing)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct tags carried by live entries.
    pub fn tag_count(&self) -> usize {
        self.tags.tag_count()
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<T>> {
        let entry = self.entries.remove(key)?;
        self.tags.remove(key, &entry.tags);
        Some(entry)
    }
}

impl<T: Clone> CacheStore<T> {
    // == Lookup ==
    /// Instrumented read used by the boundary and the response wrapper.
    ///
    /// Records a hit for a fresh entry and a miss for an absent or stale one.
    /// A stale entry is still returned so callers can serve it while revalidating.
    pub fn lookup(&mut self, key: &str) -> Option<CacheEntry<T>> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_stale() => {
                self.stats.record_hit();
                debug!("Cache hit: {}", key);
                Some(entry.clone())
            }
            Some(entry) => {
                self.stats.record_miss();
                debug!("Cache stale: {}", key);
                Some(entry.clone())
            }
            None => {
                self.stats.record_miss();
                debug!("Cache miss: {}", key);
                None
            }
        }
    }
}
