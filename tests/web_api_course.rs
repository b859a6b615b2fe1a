//! Web API Course Tests
//!
//! Integration tests for course retrieval, creation and membership.

mod common;

use axum::http::StatusCode;
use common::{create_course, create_entry, create_test_app, get_course, register_user};
use serde_json::{json, Value};

#[tokio::test]
async fn test_create_and_get_course() {
    let app = create_test_app();
    let (session, _) = register_user(&app.server, "e@mail.com").await;

    let response = app
        .server
        .post("/api/v1/courses")
        .add_cookie(session.clone())
        .json(&json!({
            "title": "Course 1",
            "description": "Intro",
            "labels": ["math"],
            "created_at": "1999-01-01T00:00:00Z"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    let course_id = created["data"]["id"].as_str().unwrap().to_string();
    assert_ne!(created["data"]["created_at"], "1999-01-01T00:00:00Z");
    assert_eq!(created["data"]["entry_ids"], json!([]));

    let body = get_course(&app.server, &session, &course_id).await;
    assert_eq!(body["data"]["title"], "Course 1");
    assert_eq!(body["data"]["labels"], json!(["math"]));
    assert_eq!(body["data"]["entries"], json!([]));
}

#[tokio::test]
async fn test_create_course_requires_title() {
    let app = create_test_app();
    let (session, _) = register_user(&app.server, "e@mail.com").await;

    let response = app
        .server
        .post("/api/v1/courses")
        .add_cookie(session)
        .json(&json!({"title": "   "}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["error"]["details"]["title"].is_array());
}

#[tokio::test]
async fn test_get_missing_course() {
    let app = create_test_app();
    let (session, _) = register_user(&app.server, "e@mail.com").await;

    let response = app
        .server
        .get(&format!("/api/v1/courses/{}", uuid::Uuid::new_v4()))
        .add_cookie(session)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_courses_omits_entries() {
    let app = create_test_app();
    let (session, _) = register_user(&app.server, "e@mail.com").await;
    let course_id = create_course(&app.server, &session, "Course 1").await;
    create_entry(&app.server, &session, &course_id, json!({"message": "hi"})).await;
    create_course(&app.server, &session, "Course 2").await;

    let response = app.server.get("/api/v1/courses").add_cookie(session).await;
    response.assert_status_ok();

    let body: Value = response.json();
    let courses = body["data"].as_array().unwrap();
    assert_eq!(courses.len(), 2);
    assert!(courses.iter().all(|c| c.get("entries").is_none()));
    assert_eq!(courses[0]["entry_ids"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_course_details() {
    let app = create_test_app();
    let (session, _) = register_user(&app.server, "e@mail.com").await;
    let course_id = create_course(&app.server, &session, "Course 1").await;

    let response = app
        .server
        .patch(&format!("/api/v1/courses/{course_id}"))
        .add_cookie(session.clone())
        .json(&json!({"description": "Updated", "labels": ["a", "b"]}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "Course 1");
    assert_eq!(body["data"]["description"], "Updated");
    assert_eq!(body["data"]["labels"], json!(["a", "b"]));
}

#[tokio::test]
async fn test_membership_lifecycle() {
    let app = create_test_app();
    let (session, owner) = register_user(&app.server, "owner@mail.com").await;
    let (_, student) = register_user(&app.server, "student@mail.com").await;
    let owner_id = owner["data"]["user"]["id"].as_str().unwrap().to_string();
    let student_id = student["data"]["user"]["id"].as_str().unwrap().to_string();
    let course_id = create_course(&app.server, &session, "Course 1").await;
    let members_path = format!("/api/v1/courses/{course_id}/members");

    // Duplicate adds collapse to one membership each
    let response = app
        .server
        .post(&members_path)
        .add_cookie(session.clone())
        .json(&json!({"members": [owner_id, student_id, student_id]}))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["data"]["members"],
        json!([owner_id, student_id])
    );

    let response = app
        .server
        .get(&members_path)
        .add_cookie(session.clone())
        .await;
    response.assert_status_ok();
    let members: Value = response.json();
    let emails: Vec<&str> = members["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails.len(), 2);
    assert!(emails.contains(&"student@mail.com"));

    let response = app
        .server
        .delete(&members_path)
        .add_cookie(session.clone())
        .json(&json!({"members": [student_id]}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["members"], json!([owner_id]));

    // Removing again is a no-op
    app.server
        .delete(&members_path)
        .add_cookie(session)
        .json(&json!({"members": [student_id]}))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_membership_on_missing_course() {
    let app = create_test_app();
    let (session, user) = register_user(&app.server, "e@mail.com").await;
    let user_id = user["data"]["user"]["id"].clone();

    app.server
        .post(&format!("/api/v1/courses/{}/members", uuid::Uuid::new_v4()))
        .add_cookie(session)
        .json(&json!({"members": [user_id]}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_courses_include_entries() {
    let app = create_test_app();
    let (session, user) = register_user(&app.server, "e@mail.com").await;
    let user_id = user["data"]["user"]["id"].as_str().unwrap().to_string();

    let mine = create_course(&app.server, &session, "Mine").await;
    create_course(&app.server, &session, "Not mine").await;
    app.server
        .post(&format!("/api/v1/courses/{mine}/members"))
        .add_cookie(session.clone())
        .json(&json!({"members": [user_id]}))
        .await
        .assert_status_ok();
    create_entry(&app.server, &session, &mine, json!({"message": "welcome"})).await;

    let response = app
        .server
        .get(&format!("/api/v1/users/{user_id}/courses"))
        .add_cookie(session.clone())
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let courses = body["data"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["id"], mine);
    assert_eq!(courses[0]["entries"][0]["message"], "welcome");

    let response = app
        .server
        .get(&format!("/api/v1/users/{user_id}"))
        .add_cookie(session)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["email"], "e@mail.com");
}

#[tokio::test]
async fn test_invalid_course_id_is_rejected() {
    let app = create_test_app();
    let (session, _) = register_user(&app.server, "e@mail.com").await;

    app.server
        .get("/api/v1/courses/not-a-uuid")
        .add_cookie(session)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
