//! Request DTOs for the HTTP API.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::course::{CourseDetailsUpdate, CourseEntryUpdate, NewCourse};
use crate::db::{NewUser, UserId};

use super::validation::{no_control_chars, not_empty_trimmed};

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Given name.
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub name: String,
    /// Family name.
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub surname: String,
}

impl RegisterRequest {
    /// Split into the profile and the plaintext password.
    pub fn into_parts(self) -> (NewUser, String) {
        let user = NewUser::new(self.email).with_name(self.name, self.surname);
        (user, self.password)
    }
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Course creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    /// Course title.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub title: String,
    /// Course description.
    #[serde(default)]
    pub description: String,
    /// Label tags.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Initial members.
    #[serde(default)]
    pub members: Vec<UserId>,
}

impl From<CreateCourseRequest> for NewCourse {
    fn from(req: CreateCourseRequest) -> Self {
        NewCourse::new(req.title)
            .with_description(req.description)
            .with_labels(req.labels)
            .with_members(req.members)
    }
}

/// Course details update request. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    /// New title.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New labels.
    pub labels: Option<Vec<String>>,
}

impl From<UpdateCourseRequest> for CourseDetailsUpdate {
    fn from(req: UpdateCourseRequest) -> Self {
        CourseDetailsUpdate {
            title: req.title,
            description: req.description,
            labels: req.labels,
        }
    }
}

/// Membership change request.
#[derive(Debug, Deserialize, Validate)]
pub struct MembersRequest {
    /// Users to add or remove.
    #[validate(length(min = 1, message = "At least one member is required"))]
    pub members: Vec<UserId>,
}

/// Entry creation request.
///
/// `pictures` carries base64-encoded image bytes; they are uploaded before
/// the entry is created and replaced by their URIs.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    /// Message body.
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub message: String,
    /// Authored date; defaults to now.
    pub date: Option<DateTime<Utc>>,
    /// Published flag.
    #[serde(default)]
    pub published: bool,
    /// Base64-encoded pictures.
    #[serde(default)]
    pub pictures: Vec<String>,
}

/// Entry update request. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEntryRequest {
    /// New message body.
    #[validate(custom(function = "no_control_chars"))]
    pub message: Option<String>,
    /// New authored date.
    pub date: Option<DateTime<Utc>>,
    /// New published flag.
    pub published: Option<bool>,
    /// Replacement picture URIs (already uploaded).
    pub pictures: Option<Vec<String>>,
}

impl From<UpdateEntryRequest> for CourseEntryUpdate {
    fn from(req: UpdateEntryRequest) -> Self {
        CourseEntryUpdate {
            message: req.message,
            pictures: req.pictures,
            date: req.date,
            published: req.published,
        }
    }
}
