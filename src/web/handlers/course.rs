//! Course handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::CourseId;
use crate::web::dto::{
    ApiResponse, CourseResponse, CreateCourseRequest, MembersRequest, ReconcileResponse,
    UpdateCourseRequest, UserResponse, ValidatedJson,
};
use crate::web::error::ApiError;

use super::AppState;

/// GET /api/v1/courses - List all courses (entries not attached).
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CourseResponse>>>, ApiError> {
    let courses = state.courses.list_courses().await?;
    Ok(Json(ApiResponse::new(
        courses.into_iter().map(CourseResponse::from).collect(),
    )))
}

/// POST /api/v1/courses - Create a course.
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateCourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CourseResponse>>), ApiError> {
    let course = state.courses.create_course(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CourseResponse::from(course))),
    ))
}

/// GET /api/v1/courses/:course_id - A course with its entries.
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<ApiResponse<CourseResponse>>, ApiError> {
    let course = state.courses.get_course(&course_id).await?;
    Ok(Json(ApiResponse::new(course.into())))
}

/// PATCH /api/v1/courses/:course_id - Update title, description or labels.
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
    ValidatedJson(req): ValidatedJson<UpdateCourseRequest>,
) -> Result<Json<ApiResponse<CourseResponse>>, ApiError> {
    let course = state
        .courses
        .update_course_details(&course_id, req.into())
        .await?;
    Ok(Json(ApiResponse::new(course.into())))
}

/// GET /api/v1/courses/:course_id/members - Resolve the member list.
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let members = state
        .courses
        .get_members(&course_id, state.users.as_ref())
        .await?;
    Ok(Json(ApiResponse::new(
        members.into_iter().map(UserResponse::from).collect(),
    )))
}

/// POST /api/v1/courses/:course_id/members - Add members.
pub async fn add_members(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
    ValidatedJson(req): ValidatedJson<MembersRequest>,
) -> Result<Json<ApiResponse<CourseResponse>>, ApiError> {
    let course = state.courses.add_members(&course_id, &req.members).await?;
    Ok(Json(ApiResponse::new(course.into())))
}

/// DELETE /api/v1/courses/:course_id/members - Remove members.
pub async fn remove_members(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
    ValidatedJson(req): ValidatedJson<MembersRequest>,
) -> Result<Json<ApiResponse<CourseResponse>>, ApiError> {
    let course = state
        .courses
        .remove_members(&course_id, &req.members)
        .await?;
    Ok(Json(ApiResponse::new(course.into())))
}

/// POST /api/v1/courses/:course_id/reconcile - Repair the entry-index.
pub async fn reconcile_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<ApiResponse<ReconcileResponse>>, ApiError> {
    let report = state.reconciler.reconcile(&course_id).await?;
    Ok(Json(ApiResponse::new(report.into())))
}
