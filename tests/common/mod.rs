//! Shared helpers for the HTTP API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Duration;
use axum_extra::extract::cookie::Cookie;
use serde_json::{json, Value};
use tempfile::TempDir;

use eduboard::auth::Authenticator;
use eduboard::file::DiskUploader;
use eduboard::web::router::{create_files_router, create_router_with_limit, DEFAULT_BODY_LIMIT};
use eduboard::web::AppState;
use eduboard::MemoryStore;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sessionID";

/// Password accepted by registration.
pub const PASSWORD: &str = "longpassword";

/// A minimal PNG header, enough for format detection.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

/// Test server over an in-memory store and a temporary upload directory.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub upload_dir: TempDir,
}

/// Cheap Argon2 parameters so tests stay fast.
fn test_authenticator() -> Authenticator {
    Authenticator::with_params(1024, 1, 1).expect("valid argon2 params")
}

/// Create a test app with the default session lifetime.
pub fn create_test_app() -> TestApp {
    create_test_app_with(|state| state)
}

/// Create a test app, letting the caller adjust the state first.
pub fn create_test_app_with(configure: impl FnOnce(AppState) -> AppState) -> TestApp {
    build_test_app(configure, DEFAULT_BODY_LIMIT)
}

/// Create a test app that rejects request bodies over `limit` bytes.
pub fn create_test_app_with_body_limit(limit: usize) -> TestApp {
    build_test_app(|state| state, limit)
}

fn build_test_app(configure: impl FnOnce(AppState) -> AppState, body_limit: usize) -> TestApp {
    let upload_dir = TempDir::new().expect("temp dir");
    let store = Arc::new(MemoryStore::new());
    let uploader =
        DiskUploader::new(upload_dir.path(), "/files").expect("Failed to create upload dir");

    let state = configure(AppState::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(uploader),
        test_authenticator(),
    ));

    let router = create_router_with_limit(Arc::new(state), &[], body_limit)
        .merge(create_files_router(upload_dir.path(), "/files"));
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        store,
        upload_dir,
    }
}

/// Create a test app whose sessions expire after `ttl`.
pub fn create_test_app_with_ttl(ttl: Duration) -> TestApp {
    create_test_app_with(|state| state.with_session_ttl(ttl))
}

/// Register a user and return the session cookie and the response body.
pub async fn register_user(server: &TestServer, email: &str) -> (Cookie<'static>, Value) {
    let response = server
        .post("/api/register")
        .json(&json!({
            "email": email,
            "password": PASSWORD,
            "name": "Test",
            "surname": "User"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    (response.cookie(SESSION_COOKIE), response.json::<Value>())
}

/// Log a user in and return the session cookie.
pub async fn login_user(server: &TestServer, email: &str) -> Cookie<'static> {
    let response = server
        .post("/api/login")
        .json(&json!({"email": email, "password": PASSWORD}))
        .await;

    response.assert_status_ok();
    response.cookie(SESSION_COOKIE)
}

/// Create a course as the holder of `session` and return its ID.
pub async fn create_course(server: &TestServer, session: &Cookie<'static>, title: &str) -> String {
    let response = server
        .post("/api/v1/courses")
        .add_cookie(session.clone())
        .json(&json!({"title": title}))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"]["id"]
        .as_str()
        .expect("course id")
        .to_string()
}

/// Create an entry in a course and return the response body.
pub async fn create_entry(
    server: &TestServer,
    session: &Cookie<'static>,
    course_id: &str,
    body: Value,
) -> Value {
    let response = server
        .post(&format!("/api/v1/courses/{course_id}/entries"))
        .add_cookie(session.clone())
        .json(&body)
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

/// Fetch a course with its entries.
pub async fn get_course(server: &TestServer, session: &Cookie<'static>, course_id: &str) -> Value {
    let response = server
        .get(&format!("/api/v1/courses/{course_id}"))
        .add_cookie(session.clone())
        .await;

    response.assert_status_ok();
    response.json::<Value>()
}
