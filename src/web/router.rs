//! Router configuration for the HTTP API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::handlers::{
    add_members, create_course, create_entry, delete_entry, get_course, get_user,
    list_courses, list_members, list_user_courses, login, logout, me, reconcile_course,
    register, remove_members, update_course, update_entry, AppState,
};
use super::middleware::{create_cors_layer, require_session};

/// Default request body limit (50MB), sized for base64 pictures.
pub const DEFAULT_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Create the main API router.
///
/// Public routes live under `/api`; everything under `/api/v1` sits behind
/// the session gate.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    create_router_with_limit(app_state, cors_origins, DEFAULT_BODY_LIMIT)
}

/// [`create_router`] with an explicit request body limit in bytes.
pub fn create_router_with_limit(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    body_limit: usize,
) -> Router {
    // Session routes (no authentication required)
    let public_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout));

    let protected_routes = Router::new()
        .route("/me", get(me))
        .route("/users/:user_id", get(get_user))
        .route("/users/:user_id/courses", get(list_user_courses))
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/:course_id",
            get(get_course).patch(update_course),
        )
        .route(
            "/courses/:course_id/members",
            get(list_members).post(add_members).delete(remove_members),
        )
        .route("/courses/:course_id/entries", post(create_entry))
        .route(
            "/courses/:course_id/entries/:entry_id",
            put(update_entry).delete(delete_entry),
        )
        .route("/courses/:course_id/reconcile", post(reconcile_course))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            require_session,
        ));

    let api_routes = Router::new()
        .merge(public_routes)
        .nest("/v1", protected_routes);

    Router::new()
        .nest("/api", api_routes)
        .merge(create_health_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// Serve uploaded files from `storage_path` under `public_prefix`.
pub fn create_files_router(storage_path: impl AsRef<Path>, public_prefix: &str) -> Router {
    let prefix = public_prefix.trim_matches('/');
    if prefix.is_empty() {
        return Router::new().fallback_service(ServeDir::new(storage_path));
    }
    Router::new().nest_service(&format!("/{prefix}"), ServeDir::new(storage_path))
}

/// Serve a built frontend from `dir`, falling back to its `index.html`.
///
/// Returns `None` if the directory does not exist.
pub fn create_static_router(dir: impl AsRef<Path>) -> Option<Router> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        tracing::warn!(path = %dir.display(), "Static directory not found, not serving frontend");
        return None;
    }

    let index = dir.join("index.html");
    Some(Router::new().fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index))))
}

/// Create a health check router.
pub fn create_health_router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_static_router_missing_dir() {
        assert!(create_static_router("/definitely/not/here").is_none());
    }

    #[test]
    fn test_create_static_router_existing_dir() {
        let temp = TempDir::new().unwrap();
        assert!(create_static_router(temp.path()).is_some());
    }

    #[test]
    fn test_create_files_router() {
        let temp = TempDir::new().unwrap();
        let _router = create_files_router(temp.path(), "/files/");
    }
}
