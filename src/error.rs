//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache layer and its HTTP surface.
///
/// "Nothing matched" for key or tag invalidation is not an error: those
/// operations succeed with a zero count.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Malformed duration expression
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// The wrapped computation failed
    #[error("Producer failed: {0}")]
    ProducerFailure(String),

    /// Missing or mismatched secret / admin token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CacheError {
    /// Wraps a producer error, keeping the whole context chain in the message.
    pub fn producer(err: anyhow::Error) -> Self {
        CacheError::ProducerFailure(format!("{:#}", err))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::InvalidDuration(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            CacheError::ProducerFailure(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
