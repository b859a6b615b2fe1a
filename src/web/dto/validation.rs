//! Validation utilities for HTTP API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Deserializes the body as JSON, then runs the `validator` rules. Field
/// failures come back as a 422 with per-field messages, and a body over the
/// router's limit as a 413.
///
/// # Example
///
/// ```ignore
/// use eduboard::web::dto::{CreateCourseRequest, ValidatedJson};
///
/// async fn create_course(
///     ValidatedJson(payload): ValidatedJson<CreateCourseRequest>,
/// ) -> Result<Json<CourseResponse>, ApiError> {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large("Request body too large")
            } else {
                ApiError::bad_request(format!("Invalid JSON: {}", e))
            }
        })?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that a string does not contain control characters or NULL bytes.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
    {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty_trimmed")
            .with_message("Must not be empty".into()));
    }
    Ok(())
}

/// Decode base64 pictures from a request body.
///
/// Accepts bare base64 or a `data:<mime>;base64,` URL. The position of the
/// first bad picture is reported.
pub fn decode_pictures(encoded: &[String]) -> Result<Vec<Vec<u8>>, ApiError> {
    encoded
        .iter()
        .enumerate()
        .map(|(idx, picture)| {
            let payload = match picture.split_once(";base64,") {
                Some((prefix, data)) if prefix.starts_with("data:") => data,
                _ => picture.as_str(),
            };
            STANDARD
                .decode(payload.trim())
                .map_err(|_| ApiError::bad_request(format!("pictures[{idx}] is not valid base64")))
        })
        .collect()
}
