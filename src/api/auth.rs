//! Authorization for the HTTP surface
//!
//! Admin routes take `Authorization: Bearer <ADMIN_TOKEN>`; the revalidation
//! endpoint takes a shared secret in its body. Both are exact string matches,
//! and an unconfigured credential matches nothing.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::handlers::AppState;
use crate::error::{CacheError, Result};

/// Extracts the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Checks a provided credential against the configured one.
pub fn verify_credential(provided: Option<&str>, expected: Option<&str>) -> bool {
    matches!((provided, expected), (Some(provided), Some(expected)) if provided == expected)
}

/// Checks the revalidation secret.
pub fn verify_secret(provided: Option<&str>, expected: Option<&str>) -> Result<()> {
    if verify_credential(provided, expected) {
        Ok(())
    } else {
        Err(CacheError::Unauthorized(
            "Invalid revalidation secret".to_string(),
        ))
    }
}

/// Middleware guarding the admin routes.
///
/// Runs before the body is read, so a rejected request has no side effects.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(request.headers());
    if !verify_credential(token, state.config.admin_token.as_deref()) {
        warn!(
            "Rejected admin request to {}: missing or invalid token",
            request.uri().path()
        );
        return Err(CacheError::Unauthorized("Admin token required".to_string()));
    }

    Ok(next.run(request).await)
}
