//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle for each endpoint, plus one
//! end-to-end run over a real socket with a cached endpoint.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use storefront_cache::{
    api::create_router,
    cache::{cache_control, cache_key_for, tag_set, with_cache},
    AppState, CacheError, Config, Ttl,
};
use tower::ServiceExt;

// == Helper Functions ==

fn test_config() -> Config {
    Config {
        revalidation_secret: Some("s3cret".to_string()),
        admin_token: Some("admin-token".to_string()),
        environment: "test".to_string(),
        ..Config::default()
    }
}

async fn seeded_state() -> AppState {
    let state = AppState::from_config(&test_config());
    {
        let mut store = state.cache.write().await;
        store.set("product:1", json!({"id": 1}), Ttl::Seconds(300), tag_set(["products"]));
        store.set(
            "product:2",
            json!({"id": 2}),
            Ttl::Seconds(300),
            tag_set(["products", "featured"]),
        );
        store.set("user:1", json!({"id": 1}), Ttl::Seconds(300), tag_set(["users"]));
        store.set("/api/rings", json!([]), Ttl::Seconds(300), HashSet::new());
        store.set("/api/rings?page=2", json!([]), Ttl::Seconds(300), HashSet::new());
        store.set("/api/ringsets", json!([]), Ttl::Seconds(300), HashSet::new());
    }
    state
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn admin_request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", "Bearer admin-token");
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn revalidate_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/revalidate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// == Dashboard Tests ==

#[tokio::test]
async fn test_dashboard_stats() {
    let state = seeded_state().await;
    let app = create_router(state);

    let response = app
        .oneshot(admin_request("GET", "/api/cache-dashboard", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["stats"]["size"], 6);
    assert_eq!(json["stats"]["tags"], 3);
    assert_eq!(json["stats"]["hitRate"], 0.0);
    assert_eq!(json["environment"], "test");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_dashboard_rejects_wrong_token() {
    let state = seeded_state().await;
    let app = create_router(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/cache-dashboard")
                .header("authorization", "Bearer wrong")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"action":"clear"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].is_string());
    assert_eq!(state.cache.read().await.len(), 6);
}

#[tokio::test]
async fn test_dashboard_invalidate_tag() {
    let state = seeded_state().await;
    let app = create_router(state.clone());

    let response = app
        .oneshot(admin_request(
            "POST",
            "/api/cache-dashboard",
            Some(r#"{"action":"invalidateTag","tag":"products"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["invalidatedCount"], 2);

    let store = state.cache.read().await;
    assert!(!store.contains("product:1"));
    assert!(!store.contains("product:2"));
    assert!(store.contains("user:1"));
    assert_eq!(store.stats().evictions, 2);
}

#[tokio::test]
async fn test_dashboard_clear() {
    let state = seeded_state().await;
    let app = create_router(state.clone());

    let response = app
        .oneshot(admin_request(
            "POST",
            "/api/cache-dashboard",
            Some(r#"{"action":"clear"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Cache cleared successfully");
    assert!(state.cache.read().await.is_empty());
}

#[tokio::test]
async fn test_dashboard_invalid_action() {
    let state = seeded_state().await;

    let missing_tag = create_router(state.clone())
        .oneshot(admin_request(
            "POST",
            "/api/cache-dashboard",
            Some(r#"{"action":"invalidateTag"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(missing_tag.status(), StatusCode::BAD_REQUEST);

    let unknown = create_router(state.clone())
        .oneshot(admin_request(
            "POST",
            "/api/cache-dashboard",
            Some(r#"{"action":"explode"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(unknown.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("explode"));

    assert_eq!(state.cache.read().await.len(), 6);
}

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_router(seeded_state().await);

    let response = app
        .oneshot(admin_request("POST", "/api/cache-dashboard", Some("{not json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == Revalidate Tests ==

#[tokio::test]
async fn test_revalidate_by_path_covers_query_variants() {
    let state = seeded_state().await;
    let app = create_router(state.clone());

    let response = app
        .oneshot(revalidate_request(r#"{"secret":"s3cret","path":"/api/rings"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["revalidated"], true);
    assert!(json["requestId"].as_str().unwrap().starts_with("rev-"));
    assert_eq!(json["logs"][0]["type"], "path");
    assert_eq!(json["logs"][0]["invalidatedCount"], 2);

    let store = state.cache.read().await;
    assert!(!store.contains("/api/rings"));
    assert!(!store.contains("/api/rings?page=2"));
    assert!(store.contains("/api/ringsets"));
}

#[tokio::test]
async fn test_revalidate_multiple_targets() {
    let state = seeded_state().await;
    let app = create_router(state.clone());

    let body = json!({
        "secret": "s3cret",
        "tags": ["featured", "users"],
        "paths": ["/api/ringsets"],
        "reason": "import",
    });

    let response = app
        .oneshot(revalidate_request(&body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["statistics"]["total"], 3);
    assert_eq!(json["statistics"]["successful"], 3);
    assert!(json["statistics"]["duration"].as_str().unwrap().ends_with("ms"));
    assert_eq!(json["logs"][0]["target"], "/api/ringsets");
    assert_eq!(json["logs"][1]["target"], "featured");
    assert_eq!(json["logs"][1]["reason"], "import");

    let store = state.cache.read().await;
    assert_eq!(store.keys(), vec!["/api/rings", "/api/rings?page=2", "product:1"]);
}

#[tokio::test]
async fn test_revalidate_wrong_secret_changes_nothing() {
    let state = seeded_state().await;
    let app = create_router(state.clone());

    let response = app
        .oneshot(revalidate_request(r#"{"secret":"guess","tag":"products"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(state.cache.read().await.len(), 6);
}

#[tokio::test]
async fn test_revalidate_missing_secret() {
    let app = create_router(seeded_state().await);

    let response = app
        .oneshot(revalidate_request(r#"{"tag":"products"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revalidate_rejected_when_secret_unconfigured() {
    let state = AppState::from_config(&Config::default());
    let app = create_router(state);

    let response = app
        .oneshot(revalidate_request(r#"{"tag":"products"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// == Entry Introspection Tests ==

#[tokio::test]
async fn test_keys_endpoint() {
    let app = create_router(seeded_state().await);

    let response = app
        .oneshot(admin_request("GET", "/api/cache/keys", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["keys"].as_array().unwrap().len(), 6);
    assert_eq!(json["keys"][0], "/api/rings");
}

#[tokio::test]
async fn test_entry_info_and_delete() {
    let state = seeded_state().await;

    let info = create_router(state.clone())
        .oneshot(admin_request("GET", "/api/cache/entries/product:2", None))
        .await
        .unwrap();
    assert_eq!(info.status(), StatusCode::OK);
    let json = body_to_json(info.into_body()).await;
    assert_eq!(json["exists"], true);
    assert_eq!(json["isStale"], false);
    assert_eq!(json["tags"], json!(["featured", "products"]));

    let deleted = create_router(state.clone())
        .oneshot(admin_request("DELETE", "/api/cache/entries/product:2", None))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    let json = body_to_json(deleted.into_body()).await;
    assert_eq!(json["invalidatedCount"], 1);

    let missing = create_router(state)
        .oneshot(admin_request("GET", "/api/cache/entries/product:2", None))
        .await
        .unwrap();
    let json = body_to_json(missing.into_body()).await;
    assert_eq!(json["exists"], false);
}

#[tokio::test]
async fn test_sweep_endpoint() {
    let state = seeded_state().await;
    state
        .cache
        .write()
        .await
        .set("no-store", json!(null), Ttl::Seconds(0), HashSet::new());
    let app = create_router(state.clone());

    let response = app
        .oneshot(admin_request("POST", "/api/cache/sweep", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["invalidatedCount"], 1);
    assert_eq!(state.cache.read().await.len(), 6);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router(AppState::from_config(&Config::default()));

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
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}

// == End-to-End ==

/// Serves a cached product listing next to the cache routes, the way an
/// application mounts its own endpoints.
fn app_with_products(state: AppState, produced: Arc<AtomicUsize>) -> Router {
    let products = get(move |State(state): State<AppState>, uri: Uri| {
        let produced = produced.clone();
        async move {
            let key = cache_key_for(uri.path(), uri.query());
            let options = state.wrap_options(["products"]);
            let cached = with_cache(&state.cache, &key, &options, || async move {
                let generation = produced.fetch_add(1, Ordering::SeqCst) + 1;
                Ok::<_, anyhow::Error>(json!({ "products": ["ring"], "generation": generation }))
            })
            .await?;

            Ok::<_, CacheError>((
                [(
                    header::CACHE_CONTROL,
                    cache_control(options.ttl, options.skip_cache),
                )],
                Json(cached.value),
            ))
        }
    });

    create_router(state.clone()).merge(
        Router::new()
            .route("/api/products", products)
            .with_state(state),
    )
}

#[tokio::test]
async fn test_end_to_end_cached_endpoint_and_revalidation() {
    let config = Config {
        default_duration: "2m".parse().unwrap(),
        ..test_config()
    };
    let state = AppState::from_config(&config);
    let produced = Arc::new(AtomicUsize::new(0));
    let app = app_with_products(state.clone(), produced.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    // First request produces, second is served from cache
    for _ in 0..2 {
        let response = client
            .get(format!("{}/api/products", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(
            response.headers()["cache-control"],
            "s-maxage=120, stale-while-revalidate=60"
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["generation"], 1);
    }
    client
        .get(format!("{}/api/products?page=2", base))
        .send()
        .await
        .unwrap();
    assert_eq!(produced.load(Ordering::SeqCst), 2);

    let revalidation: Value = client
        .post(format!("{}/api/revalidate", base))
        .json(&json!({ "secret": "s3cret", "path": "/api/products" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(revalidation["success"], true);
    assert_eq!(revalidation["logs"][0]["invalidatedCount"], 2);

    let body: Value = client
        .get(format!("{}/api/products", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["generation"], 3);

    let dashboard: Value = client
        .get(format!("{}/api/cache-dashboard", base))
        .bearer_auth("admin-token")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["stats"]["size"], 1);
    assert_eq!(dashboard["stats"]["hits"], 1);
    assert_eq!(dashboard["stats"]["evictions"], 2);

    let store = state.cache.read().await;
    let entry = store.get("/api/products").unwrap();
    assert_eq!(entry.expires_at, Some(entry.last_updated + 120_000));
}
