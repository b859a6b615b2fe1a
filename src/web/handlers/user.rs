//! User handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::db::UserId;
use crate::web::dto::{ApiResponse, CourseResponse, UserResponse};
use crate::web::error::ApiError;

use super::AppState;

/// GET /api/v1/users/:id - Public profile of a user.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.sessions.get_user(&user_id).await?;
    Ok(Json(ApiResponse::new(user.into())))
}

/// GET /api/v1/users/:id/courses - Courses the user belongs to, with entries.
pub async fn list_user_courses(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<ApiResponse<Vec<CourseResponse>>>, ApiError> {
    let courses = state.courses.get_courses_by_member(&user_id).await?;
    Ok(Json(ApiResponse::new(
        courses.into_iter().map(CourseResponse::from).collect(),
    )))
}
