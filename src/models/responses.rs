//! Response DTOs for the cache HTTP surface
//!
//! Defines the structure of outgoing HTTP response bodies. Field names are
//! camelCase on the wire.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::TargetKind;

/// Current RFC 3339 timestamp.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Cache statistics snapshot (GET /api/cache-dashboard, `stats`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Current number of entries in cache
    pub size: usize,
    /// Distinct tags carried by live entries
    pub tags: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub revalidations: u64,
    /// hits / (hits + misses), 0 when nothing was read
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            size: stats.size,
            tags: stats.tags,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            revalidations: stats.revalidations,
        }
    }
}

/// Response body for GET /api/cache-dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub stats: StatsResponse,
    pub timestamp: String,
    pub environment: String,
}

/// Response for a full clear
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

impl ClearResponse {
    pub fn new() -> Self {
        Self {
            success: true,
            message: "Cache cleared successfully".to_string(),
            timestamp: timestamp(),
        }
    }
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response for any targeted invalidation (tag, key, path, sweep)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateResponse {
    pub success: bool,
    pub message: String,
    /// Number of entries removed; zero is still a success
    pub invalidated_count: usize,
    pub timestamp: String,
}

impl InvalidateResponse {
    pub fn new(message: impl Into<String>, invalidated_count: usize) -> Self {
        Self {
            success: true,
            message: message.into(),
            invalidated_count,
            timestamp: timestamp(),
        }
    }
}

/// Response body for POST /api/cache-dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DashboardActionResponse {
    Cleared(ClearResponse),
    Invalidated(InvalidateResponse),
}

/// Response body for GET /api/cache/keys
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}

/// Outcome of one revalidation target
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevalidationLog {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: TargetKind,
    pub target: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub invalidated_count: usize,
}

/// Aggregate counts for a revalidation request
#[derive(Debug, Clone, Serialize)]
pub struct RevalidationStatistics {
    pub total: usize,
    pub successful: usize,
    /// Elapsed time, e.g. `"3ms"`
    pub duration: String,
}

/// Response body for POST /api/revalidate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevalidateResponse {
    /// True when every target succeeded
    pub success: bool,
    pub revalidated: bool,
    pub request_id: String,
    pub statistics: RevalidationStatistics,
    pub logs: Vec<RevalidationLog>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: timestamp(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
