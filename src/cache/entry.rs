//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with expiry and tag metadata.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::cache::Ttl;

// == Cache Entry ==
/// One cached value plus its metadata.
///
/// Staleness is computed at read time; nothing sweeps an entry in the
/// background when it goes stale.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// The producer's result, never inspected by the cache
    pub value: T,
    /// Expiration timestamp in Unix milliseconds (None = never expires)
    pub expires_at: Option<u64>,
    /// Unix milliseconds of the most recent write
    pub last_updated: u64,
    /// Labels used for bulk invalidation
    pub tags: HashSet<String>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry written now.
    pub fn new(value: T, ttl: Ttl, tags: HashSet<String>) -> Self {
        let now = current_timestamp_ms();

        Self {
            value,
            expires_at: ttl.expires_at(now),
            last_updated: now,
            tags,
        }
    }

    // == Is Stale ==
    /// Checks if the entry has gone stale.
    ///
    /// Boundary condition: an entry is stale once the current time reaches its
    /// expiry, so a zero-second entry is stale on the very next check. An entry
    /// without expiry is never stale.
    pub fn is_stale(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Has Tag ==
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, or None if the entry never expires.
    ///
    /// Returns `Some(0)` once the entry is stale.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }

    /// Milliseconds elapsed since the last write.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.last_updated)
    }

    /// Describes the entry without exposing its value.
    pub fn info(&self) -> CacheInfo {
        let mut tags: Vec<String> = self.tags.iter().cloned().collect();
        tags.sort();

        CacheInfo {
            exists: true,
            is_stale: self.is_stale(),
            last_updated: Some(self.last_updated),
            expires_at: self.expires_at,
            tags,
        }
    }
}

// == Cache Info ==
/// Introspection view of a single key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    /// Whether an entry exists for the key
    pub exists: bool,
    /// Whether the entry is stale (false when absent)
    pub is_stale: bool,
    /// Unix milliseconds of the last write
    pub last_updated: Option<u64>,
    /// Unix milliseconds of expiry (None = never, or absent)
    pub expires_at: Option<u64>,
    /// Sorted tag list
    pub tags: Vec<String>,
}

impl CacheInfo {
    /// Info reported for a key with no entry.
    pub fn missing() -> Self {
        Self {
            exists: false,
            is_stale: false,
            last_updated: None,
            expires_at: None,
            tags: Vec::new(),
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Builds a tag set from anything yielding strings.
pub fn tag_set<I, S>(tags: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tags.into_iter().map(Into::into).collect()
}
