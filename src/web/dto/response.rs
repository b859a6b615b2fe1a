//! Response DTOs for the HTTP API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::course::{AggregatedCourse, Course, CourseEntry, ReconcileReport};
use crate::db::{CourseId, EntryId, User, UserId};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// User DTOs
// ============================================================================

/// Public view of a user. Never carries the password hash or session token.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            surname: user.surname,
            created_at: user.created_at,
        }
    }
}

/// Register/login response. The token itself travels in the session cookie.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The logged-in user.
    pub user: UserResponse,
    /// When the session expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<User> for SessionResponse {
    fn from(user: User) -> Self {
        let expires_at = user.session.as_ref().map(|s| s.expires_at);
        Self {
            user: user.into(),
            expires_at,
        }
    }
}

// ============================================================================
// Course DTOs
// ============================================================================

/// Course entry.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    /// Entry ID.
    pub id: EntryId,
    /// Owning course.
    pub course_id: CourseId,
    /// Message body.
    pub message: String,
    /// Picture URIs.
    pub pictures: Vec<String>,
    /// Authored date.
    pub date: DateTime<Utc>,
    /// Storage timestamp.
    pub created_at: DateTime<Utc>,
    /// Published flag.
    pub published: bool,
}

impl From<CourseEntry> for EntryResponse {
    fn from(entry: CourseEntry) -> Self {
        Self {
            id: entry.id,
            course_id: entry.course_id,
            message: entry.message,
            pictures: entry.pictures,
            date: entry.date,
            created_at: entry.created_at,
            published: entry.published,
        }
    }
}

/// Course, with entries attached only on single-course and by-member reads.
#[derive(Debug, Serialize)]
pub struct CourseResponse {
    /// Course ID.
    pub id: CourseId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Label tags.
    pub labels: Vec<String>,
    /// Member user IDs.
    pub members: Vec<UserId>,
    /// IDs of the course's entries.
    pub entry_ids: Vec<EntryId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Attached entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<EntryResponse>>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            labels: course.labels,
            members: course.members,
            entry_ids: course.entry_ids,
            created_at: course.created_at,
            entries: None,
        }
    }
}

impl From<AggregatedCourse> for CourseResponse {
    fn from(aggregated: AggregatedCourse) -> Self {
        let entries = aggregated.entries.into_iter().map(Into::into).collect();
        Self {
            entries: Some(entries),
            ..aggregated.course.into()
        }
    }
}

/// Outcome of a reconciliation run.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    /// Course that was checked.
    pub course_id: CourseId,
    /// Entries added to the index.
    pub orphans_indexed: Vec<EntryId>,
    /// Index IDs removed.
    pub dangling_removed: Vec<EntryId>,
}

impl From<ReconcileReport> for ReconcileResponse {
    fn from(report: ReconcileReport) -> Self {
        Self {
            course_id: report.course_id,
            orphans_indexed: report.orphans_indexed,
            dangling_removed: report.dangling_removed,
        }
    }
}
