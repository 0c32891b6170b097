//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::auth::require_admin;
use super::handlers::{
    dashboard_action_handler, dashboard_stats_handler, entry_delete_handler, entry_info_handler,
    health_handler, keys_handler, revalidate_handler, sweep_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `POST /api/revalidate` - Invalidate paths and tags (body secret)
/// - `GET /api/cache-dashboard` - Statistics snapshot (admin)
/// - `POST /api/cache-dashboard` - `clear` / `invalidateTag` actions (admin)
/// - `GET /api/cache/keys` - List keys (admin)
/// - `GET /api/cache/entries/*key` - Entry metadata (admin)
/// - `DELETE /api/cache/entries/*key` - Drop one entry (admin)
/// - `POST /api/cache/sweep` - Drop stale entries (admin)
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin = Router::new()
        .route(
            "/api/cache-dashboard",
            get(dashboard_stats_handler).post(dashboard_action_handler),
        )
        .route("/api/cache/keys", get(keys_handler))
        .route(
            "/api/cache/entries/*key",
            get(entry_info_handler).delete(entry_delete_handler),
        )
        .route("/api/cache/sweep", post(sweep_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/revalidate", post(revalidate_handler))
        .merge(admin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let config = Config {
            revalidation_secret: Some("s3cret".to_string()),
            admin_token: Some("admin".to_string()),
            ..Config::default()
        };
        create_router(AppState::from_config(&config))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dashboard_requires_token() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cache-dashboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_dashboard_with_token() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cache-dashboard")
                    .header("authorization", "Bearer admin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_revalidate_wrong_secret() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/revalidate")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"secret":"nope","tag":"products"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_revalidate_without_targets() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/revalidate")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"secret":"s3cret"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
