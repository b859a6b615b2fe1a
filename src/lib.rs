//! eduboard - educational platform backend
//!
//! Session-based accounts, courses with members, and dated course entries
//! with pictures, served over an HTTP API.

pub mod auth;
pub mod config;
pub mod course;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use auth::{Authenticator, UserSessionService};
pub use config::Config;
pub use course::{CourseEntryService, CourseService, Reconciler};
pub use db::{MemoryStore, NewUser, User};
#[cfg(feature = "sqlite")]
pub use db::Database;
pub use error::{EduboardError, Result};
