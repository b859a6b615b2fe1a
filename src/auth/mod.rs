//! Authentication module for eduboard.
//!
//! This module provides password hashing, session token generation,
//! input validation and the user session lifecycle.

mod password;
mod session;
pub mod validation;

pub use password::{
    Authenticator, PasswordError, DEFAULT_ITERATIONS, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM,
    SESSION_TOKEN_BYTES,
};
pub use session::{UserSessionService, DEFAULT_SESSION_TTL_SECS};
pub use validation::ValidationError;
