//! API Module
//!
//! HTTP handlers, authorization and routing for the cache administration and
//! revalidation surface.

pub mod auth;
pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
