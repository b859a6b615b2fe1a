//! Course entry handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::course::NewCourseEntry;
use crate::db::{CourseId, EntryId};
use crate::web::dto::validation::decode_pictures;
use crate::web::dto::{
    ApiResponse, CreateEntryRequest, EntryResponse, UpdateEntryRequest, ValidatedJson,
};
use crate::web::error::ApiError;

use super::AppState;

/// POST /api/v1/courses/:course_id/entries - Upload pictures, then create the entry.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
    ValidatedJson(req): ValidatedJson<CreateEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EntryResponse>>), ApiError> {
    let files = decode_pictures(&req.pictures)?;
    let pictures = state
        .entries
        .upload_entry_assets(&files, &course_id, Utc::now())
        .await?;

    let mut new_entry = NewCourseEntry::new(req.message).with_pictures(pictures);
    new_entry.date = req.date;
    new_entry.published = req.published;

    let entry = state.entries.create_entry(new_entry, &course_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(EntryResponse::from(entry))),
    ))
}

/// PUT /api/v1/courses/:course_id/entries/:entry_id - Update an entry.
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Path((course_id, entry_id)): Path<(CourseId, EntryId)>,
    ValidatedJson(req): ValidatedJson<UpdateEntryRequest>,
) -> Result<Json<ApiResponse<EntryResponse>>, ApiError> {
    let entry = state
        .entries
        .update_entry(&entry_id, &course_id, req.into())
        .await?;
    Ok(Json(ApiResponse::new(entry.into())))
}

/// DELETE /api/v1/courses/:course_id/entries/:entry_id - Delete an entry.
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path((course_id, entry_id)): Path<(CourseId, EntryId)>,
) -> Result<StatusCode, ApiError> {
    state.entries.delete_entry(&entry_id, &course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
