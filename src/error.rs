//! Error types for eduboard.

use thiserror::Error;

use crate::auth::{PasswordError, ValidationError};
use crate::db::{CourseId, EntryId, StoreError};
use crate::file::UploadError;

/// Common error type for eduboard.
#[derive(Error, Debug)]
pub enum EduboardError {
    /// Resource not found (user, session, ...).
    #[error("{0} not found")]
    NotFound(String),

    /// The referenced course does not exist.
    #[error("course {0} not found")]
    CourseNotFound(CourseId),

    /// The referenced course entry does not exist.
    #[error("course entry {0} not found")]
    EntryNotFound(EntryId),

    /// A user with this email is already registered.
    #[error("email already registered")]
    DuplicateEmail,

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Email/password pair did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The session exists but its expiry has passed.
    #[error("session expired")]
    SessionExpired,

    /// Request rejected by the authentication gate.
    #[error("forbidden")]
    Forbidden,

    /// The entry exists but is owned by a different course.
    #[error("course entry {entry} does not belong to course {course}")]
    EntryCourseMismatch {
        /// Entry that was addressed.
        entry: EntryId,
        /// Course the caller claimed owns it.
        course: CourseId,
    },

    /// Underlying store failure, with the operation that issued it.
    #[error("{context}: {source}")]
    Storage {
        /// What the service was doing.
        context: String,
        /// Store-level error.
        #[source]
        source: StoreError,
    },

    /// Password hashing or comparison failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// File upload failed.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<ValidationError> for EduboardError {
    fn from(err: ValidationError) -> Self {
        EduboardError::Validation(err.to_string())
    }
}

impl EduboardError {
    /// Wrap a store error with the operation that produced it.
    pub fn storage(context: impl Into<String>, source: StoreError) -> Self {
        EduboardError::Storage {
            context: context.into(),
            source,
        }
    }

    /// Whether this error means "the addressed thing does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EduboardError::NotFound(_)
                | EduboardError::CourseNotFound(_)
                | EduboardError::EntryNotFound(_)
        )
    }
}

/// Attach operation context to store results.
pub trait StoreResultExt<T> {
    /// Convert a `StoreError` into `EduboardError::Storage` with `context`.
    fn context(self, context: &str) -> Result<T>;
}

impl<T> StoreResultExt<T> for std::result::Result<T, StoreError> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|e| EduboardError::storage(context, e))
    }
}

/// Result type alias for eduboard operations.
pub type Result<T> = std::result::Result<T, EduboardError>;
