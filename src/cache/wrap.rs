//! Cacheable Response Wrapper
//!
//! Memoizes a producer behind a request-derived key for server endpoints, with
//! stale-if-error fallback and optional cache metadata for response headers.

use std::collections::HashSet;
use std::future::Future;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{SharedCache, Ttl};
use crate::error::{CacheError, Result};

// == Wrap Options ==
#[derive(Debug, Clone, PartialEq)]
pub struct WrapOptions {
    /// Freshness window (default 60 seconds)
    pub ttl: Ttl,
    /// Tags attached to the written entry
    pub tags: HashSet<String>,
    /// Bypass the cache: always produce, never write back
    pub skip_cache: bool,
    /// Echo cache metadata alongside the payload
    pub include_metadata: bool,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            ttl: Ttl::Seconds(60),
            tags: HashSet::new(),
            skip_cache: false,
            include_metadata: false,
        }
    }
}

impl WrapOptions {
    fn metadata(&self) -> Option<CacheMetadata> {
        if !self.include_metadata {
            return None;
        }

        let mut tags: Vec<String> = self.tags.iter().cloned().collect();
        tags.sort();
        Some(CacheMetadata {
            ttl: self.ttl,
            tags,
            cached_at: chrono::Utc::now().to_rfc3339(),
            skipped: self.skip_cache,
        })
    }
}

// == Cache Metadata ==
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    pub ttl: Ttl,
    pub tags: Vec<String>,
    /// RFC 3339 time the payload was served
    pub cached_at: String,
    pub skipped: bool,
}

// == Cached ==
/// A payload plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    /// Served from a fresh entry without running the producer
    pub hit: bool,
    /// Served from a stale entry because the producer failed
    pub stale: bool,
    pub metadata: Option<CacheMetadata>,
}

// == With Cache ==
/// Returns the cached payload for `key` or produces a fresh one.
///
/// - fresh entry: served as a hit, producer not called
/// - stale or absent entry: producer called, success written back
/// - producer failure over a stale entry: the stale value is served
/// - producer failure with nothing cached: [`CacheError::ProducerFailure`]
pub async fn with_cache<T, F, Fut>(
    cache: &SharedCache<T>,
    key: &str,
    options: &WrapOptions,
    producer: F,
) -> Result<Cached<T>>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    if options.skip_cache {
        debug!("Cache skipped: {}", key);
        let value = producer().await.map_err(CacheError::producer)?;
        return Ok(Cached {
            value,
            hit: false,
            stale: false,
            metadata: options.metadata(),
        });
    }

    let existing = cache.write().await.lookup(key);
    if let Some(entry) = &existing {
        if !entry.is_stale() {
            return Ok(Cached {
                value: entry.value.clone(),
                hit: true,
                stale: false,
                metadata: options.metadata(),
            });
        }
    }

    match producer().await {
        Ok(value) => {
            let mut store = cache.write().await;
            if store.contains(key) {
                store.record_revalidation();
            }
            store.set(key, value.clone(), options.ttl, options.tags.clone());

            Ok(Cached {
                value,
                hit: false,
                stale: false,
                metadata: options.metadata(),
            })
        }
        Err(err) => match existing {
            Some(entry) => {
                warn!("Serving stale value for '{}': {:#}", key, err);
                Ok(Cached {
                    value: entry.value,
                    hit: false,
                    stale: true,
                    metadata: options.metadata(),
                })
            }
            None => Err(CacheError::producer(err)),
        },
    }
}

// == Key Derivation ==
/// Cache key for a request: the path, plus `?query` when there is one.
pub fn cache_key_for(path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path.to_string(),
    }
}

// == Cache-Control ==
/// `Cache-Control` value matching a wrapped response's freshness window.
pub fn cache_control(ttl: Ttl, skip_cache: bool) -> String {
    const ONE_YEAR: u64 = 365 * 24 * 60 * 60;

    match (skip_cache, ttl) {
        (true, _) | (false, Ttl::Seconds(0)) => "no-store, must-revalidate".to_string(),
        (false, Ttl::Seconds(secs)) => {
            format!("s-maxage={}, stale-while-revalidate={}", secs, secs / 2)
        }
        (false, Ttl::Forever) => format!("s-maxage={}, immutable", ONE_YEAR),
    }
}
