//! Session-cookie authentication gate.
//!
//! Every protected route runs [`require_session`] first. It reads the
//! session cookie, resolves it through the session service and stores the
//! caller's identity in the request extensions, where handlers pick it up
//! with the [`AuthUser`] extractor. Requests that fail the check never reach
//! the handler.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::db::{SessionToken, UserId};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::EduboardError;

/// Identity of the caller, attached by [`require_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| ApiError::forbidden("Forbidden"))
    }
}

/// Reject the request unless it carries a live session cookie.
///
/// A missing cookie is rejected without consulting the session store. An
/// unknown or expired session is rejected with the same opaque 403; the
/// reason is only logged. Store failures surface as 500.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(&state.cookie.name)
        .map(|cookie| SessionToken::new(cookie.value()))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            tracing::debug!(path = %request.uri().path(), "Rejected request without session cookie");
            ApiError::forbidden("Forbidden")
        })?;

    let user_id = match state.sessions.check_authentication(&token).await {
        Ok(user_id) => user_id,
        Err(err @ EduboardError::Storage { .. }) => return Err(err.into()),
        Err(err) => {
            tracing::debug!(path = %request.uri().path(), reason = %err, "Rejected session");
            return Err(ApiError::forbidden("Forbidden"));
        }
    };

    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}
