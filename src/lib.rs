//! Storefront Cache - server-side caching for a storefront
//!
//! A process-wide key/value cache with freshness windows and tag-based
//! invalidation, a stale-while-revalidate boundary over async producers, a
//! response wrapper for cacheable endpoints, and the HTTP surface for
//! on-demand revalidation and administration.

pub mod admin;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use admin::CacheAdmin;
pub use api::AppState;
pub use cache::{
    parse_duration, shared_cache, with_cache, CacheBoundary, CacheOptions, CacheStore,
    SharedCache, Ttl,
};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
