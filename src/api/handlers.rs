//! API Handlers
//!
//! HTTP request handlers for the dashboard, introspection and revalidation
//! endpoints.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use super::auth::verify_secret;
use crate::admin::CacheAdmin;
use crate::cache::{
    current_timestamp_ms, shared_cache, tag_set, CacheInfo, CacheOptions, SharedCache,
    WrapOptions,
};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    responses::timestamp, DashboardAction, DashboardActionRequest, DashboardActionResponse,
    DashboardResponse, HealthResponse, InvalidateResponse, KeysResponse, RevalidateRequest,
    RevalidateResponse, RevalidationLog, RevalidationStatistics, TargetKind,
};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Application state shared across all handlers.
///
/// The cache holds JSON payloads so any endpoint can memoize its response.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide cache
    pub cache: SharedCache<Value>,
    /// Administrative handle over the same cache
    pub admin: CacheAdmin<Value>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: SharedCache<Value>, config: Config) -> Self {
        Self {
            admin: CacheAdmin::new(cache.clone()),
            cache,
            config: Arc::new(config),
        }
    }

    /// Creates a new AppState with an empty cache.
    pub fn from_config(config: &Config) -> Self {
        Self::new(shared_cache(), config.clone())
    }

    /// Wrapper options for a cached endpoint, fresh for `DEFAULT_CACHE_DURATION`.
    pub fn wrap_options<I, S>(&self, tags: I) -> WrapOptions
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        WrapOptions {
            ttl: self.config.default_duration,
            tags: tag_set(tags),
            ..WrapOptions::default()
        }
    }

    /// Boundary options fresh for `DEFAULT_CACHE_DURATION`.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions::new().with_duration(self.config.default_duration)
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /api/cache-dashboard
pub async fn dashboard_stats_handler(State(state): State<AppState>) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        stats: state.admin.stats().await,
        timestamp: timestamp(),
        environment: state.config.environment.clone(),
    })
}

/// Handler for POST /api/cache-dashboard
///
/// Actions: `clear`, `invalidateTag` (requires `tag`).
pub async fn dashboard_action_handler(
    State(state): State<AppState>,
    Json(req): Json<DashboardActionRequest>,
) -> Result<Json<DashboardActionResponse>> {
    let action = req.action().map_err(CacheError::InvalidRequest)?;

    let response = match action {
        DashboardAction::Clear => DashboardActionResponse::Cleared(state.admin.clear_all().await),
        DashboardAction::InvalidateTag(tag) => {
            DashboardActionResponse::Invalidated(state.admin.invalidate_tag(&tag).await)
        }
    };

    Ok(Json(response))
}

/// Handler for GET /api/cache/keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse {
        keys: state.admin.keys().await,
    })
}

/// Handler for GET /api/cache/entries/*key
pub async fn entry_info_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<CacheInfo> {
    Json(state.admin.info(&key).await)
}

/// Handler for DELETE /api/cache/entries/*key
///
/// Deleting a missing key succeeds with a zero count.
pub async fn entry_delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<InvalidateResponse> {
    Json(state.admin.invalidate_key(&key).await)
}

/// Handler for POST /api/cache/sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    Json(state.admin.sweep().await)
}

/// Handler for POST /api/revalidate
///
/// The secret is checked before anything else; a mismatch touches nothing.
/// Each path drops its cached responses, each tag drops its tagged entries.
pub async fn revalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<RevalidateRequest>,
) -> Result<Json<RevalidateResponse>> {
    let started = Instant::now();
    let request_id = format!(
        "rev-{}-{}",
        current_timestamp_ms(),
        NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
    );

    if let Err(err) = verify_secret(
        req.secret.as_deref(),
        state.config.revalidation_secret.as_deref(),
    ) {
        warn!("[{}] Invalid revalidation secret provided", request_id);
        return Err(err);
    }

    if let Some(error_msg) = req.validate() {
        warn!("[{}] {}", request_id, error_msg);
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut logs = Vec::new();
    for (kind, target) in req.targets() {
        if target.trim().is_empty() {
            warn!("[{}] Skipping empty {:?} target", request_id, kind);
            logs.push(RevalidationLog {
                timestamp: timestamp(),
                kind,
                target,
                success: false,
                reason: Some("Empty target".to_string()),
                invalidated_count: 0,
            });
            continue;
        }

        let outcome = match kind {
            TargetKind::Path => state.admin.invalidate_path(&target).await,
            TargetKind::Tag => state.admin.invalidate_tag(&target).await,
        };
        info!(
            "[{}] Revalidated {:?} '{}': {} entries",
            request_id, kind, target, outcome.invalidated_count
        );

        logs.push(RevalidationLog {
            timestamp: timestamp(),
            kind,
            target,
            success: outcome.success,
            reason: req.reason.clone(),
            invalidated_count: outcome.invalidated_count,
        });
    }

    let total = logs.len();
    let successful = logs.iter().filter(|log| log.success).count();
    let elapsed = started.elapsed().as_millis();
    info!(
        "[{}] Revalidation completed in {}ms, {}/{} operations successful",
        request_id, elapsed, successful, total
    );

    Ok(Json(RevalidateResponse {
        success: total > 0 && successful == total,
        revalidated: true,
        request_id,
        statistics: RevalidationStatistics {
            total,
            successful,
            duration: format!("{}ms", elapsed),
        },
        logs,
    }))
}
