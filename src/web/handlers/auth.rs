//! Authentication handlers.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::db::{SessionToken, User};
use crate::web::dto::{
    ApiResponse, LoginRequest, RegisterRequest, SessionResponse, UserResponse, ValidatedJson,
};
use crate::web::error::{ApiError, INVALID_CREDENTIALS};
use crate::web::middleware::AuthUser;
use crate::EduboardError;

use super::AppState;

/// Build the session cookie for a freshly issued session.
fn session_cookie(state: &AppState, token: &SessionToken) -> Cookie<'static> {
    Cookie::build((state.cookie.name.clone(), token.as_str().to_string()))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(state.cookie.secure)
        .build()
}

fn with_session(state: &AppState, jar: CookieJar, user: &User) -> CookieJar {
    match user.session_token() {
        Some(token) => jar.add(session_cookie(state, token)),
        None => jar,
    }
}

/// POST /api/register - Create an account and log it in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<SessionResponse>>), ApiError> {
    let (new_user, password) = req.into_parts();
    let user = state.sessions.register(new_user, &password).await?;

    let jar = with_session(&state, jar, &user);
    Ok((
        StatusCode::CREATED,
        jar,
        Json(ApiResponse::new(SessionResponse::from(user))),
    ))
}

/// POST /api/login - Log in with email and password.
///
/// An unknown email and a wrong password produce the same response.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<SessionResponse>>), ApiError> {
    let user = match state.sessions.login(&req.email, &req.password).await {
        Ok(user) => user,
        Err(EduboardError::NotFound(_)) | Err(EduboardError::InvalidCredentials) => {
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS))
        }
        Err(e) => return Err(e.into()),
    };

    let jar = with_session(&state, jar, &user);
    Ok((jar, Json(ApiResponse::new(SessionResponse::from(user)))))
}

/// POST /api/logout - End the caller's session.
///
/// A request without a session cookie is already logged out and succeeds.
/// A cookie naming an unknown session is removed along with the 404.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), (CookieJar, ApiError)> {
    let token = jar
        .get(&state.cookie.name)
        .map(|cookie| SessionToken::new(cookie.value()))
        .unwrap_or_else(|| SessionToken::new(""));
    let removal = Cookie::build((state.cookie.name.clone(), "")).path("/");

    match state.sessions.logout(&token).await {
        Ok(()) => Ok((StatusCode::NO_CONTENT, jar.remove(removal))),
        Err(err) if err.is_not_found() => Err((jar.remove(removal), err.into())),
        Err(err) => Err((jar, err.into())),
    }
}

/// GET /api/v1/me - The logged-in user.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.sessions.get_user(&user_id).await?;
    Ok(Json(ApiResponse::new(user.into())))
}
