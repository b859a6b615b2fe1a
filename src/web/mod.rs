//! HTTP API module for eduboard.
//!
//! Exposes the session lifecycle publicly under `/api` and the course and
//! entry services under `/api/v1`, behind the session-cookie gate.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::{AppState, CookieSettings};
pub use router::create_router;
pub use server::WebServer;
