//! API handlers.

pub mod auth;
pub mod course;
pub mod entry;
pub mod state;
pub mod user;

pub use auth::*;
pub use course::*;
pub use entry::*;
pub use state::{AppState, CookieSettings};
pub use user::*;
