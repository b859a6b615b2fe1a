//! Middleware for the HTTP API.

pub mod auth;
pub mod cors;

pub use auth::{require_session, AuthUser};
pub use cors::create_cors_layer;
