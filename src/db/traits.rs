//! Store abstraction traits for eduboard.
//!
//! Each trait covers one capability (insert, find one, find many, update,
//! delete) of one collection. Services name only the capabilities they use,
//! so any backend, or a test double, can stand in for the document store.
//!
//! # Atomicity
//!
//! Every operation here is atomic on a single document. Nothing is atomic
//! across documents: inserting an entry and pushing its ID into the course
//! index are two separate calls, and callers must order them accordingly.

use async_trait::async_trait;
use thiserror::Error;

use crate::course::{Course, CourseDetailsUpdate, CourseEntry, CourseEntryUpdate};

use super::{CourseId, EntryId, SessionToken, User, UserId};

/// Errors reported by a store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend failure (connection, I/O, query).
    #[error("database error: {0}")]
    Database(String),

    /// A stored document could not be decoded or encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The document targeted by a write does not exist.
    #[error("missing document: {0}")]
    Missing(String),
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ============================================================================
// Users
// ============================================================================

/// Persist a new user.
#[async_trait]
pub trait UserStorer: Send + Sync {
    /// Store a new user. Fails with `Conflict` if the email is taken.
    async fn store(&self, user: &User) -> StoreResult<()>;
}

/// Find a user by ID.
#[async_trait]
pub trait UserFinder: Send + Sync {
    /// Get a user by ID.
    async fn find_by_id(&self, id: &UserId) -> StoreResult<Option<User>>;
}

/// Find a user by email.
#[async_trait]
pub trait UserEmailFinder: Send + Sync {
    /// Get a user by exact email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

/// Find a user by session token.
#[async_trait]
pub trait UserSessionFinder: Send + Sync {
    /// Get the user currently holding `token`.
    async fn find_by_session_token(&self, token: &SessionToken) -> StoreResult<Option<User>>;
}

/// Overwrite a user's session.
#[async_trait]
pub trait UserSessionUpdater: Send + Sync {
    /// Write `user.session` to the stored user. Fails with `Missing` if the
    /// user does not exist.
    async fn update_session(&self, user: &User) -> StoreResult<()>;

    /// Clear the session of user `id`, but only while it still holds
    /// `token`. Returns false if the session was replaced or already gone.
    async fn clear_session(&self, id: &UserId, token: &SessionToken) -> StoreResult<bool>;
}

/// Resolve many users at once.
#[async_trait]
pub trait UserBatchFinder: Send + Sync {
    /// Get every user whose ID is in `ids`. Unknown IDs are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;
}

/// Everything the session lifecycle needs from the user collection.
pub trait UserDirectory:
    UserStorer
    + UserFinder
    + UserEmailFinder
    + UserSessionFinder
    + UserSessionUpdater
    + UserBatchFinder
{
}

impl<T> UserDirectory for T where
    T: UserStorer
        + UserFinder
        + UserEmailFinder
        + UserSessionFinder
        + UserSessionUpdater
        + UserBatchFinder
{
}

// ============================================================================
// Courses
// ============================================================================

/// Selects courses for [`CourseManyFinder::find_many`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseFilter {
    /// Every course.
    All,
    /// Courses whose member list contains the user.
    Member(UserId),
}

impl CourseFilter {
    /// Whether `course` passes the filter.
    pub fn matches(&self, course: &Course) -> bool {
        match self {
            CourseFilter::All => true,
            CourseFilter::Member(user_id) => course.has_member(user_id),
        }
    }
}

/// Single-document update applied atomically to one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseUpdate {
    /// Add each user to the member list unless already present.
    AddMembers(Vec<UserId>),
    /// Remove every occurrence of each user from the member list.
    RemoveMembers(Vec<UserId>),
    /// Append an entry ID to the entry-index unless already present.
    PushEntry(EntryId),
    /// Remove every occurrence of an entry ID from the entry-index.
    PullEntry(EntryId),
    /// Overwrite descriptive fields.
    SetDetails(CourseDetailsUpdate),
}

impl CourseUpdate {
    /// Apply the update to an in-memory course document.
    pub fn apply_to(&self, course: &mut Course) {
        match self {
            CourseUpdate::AddMembers(ids) => {
                for id in ids {
                    if !course.members.contains(id) {
                        course.members.push(*id);
                    }
                }
            }
            CourseUpdate::RemoveMembers(ids) => course.members.retain(|m| !ids.contains(m)),
            CourseUpdate::PushEntry(id) => {
                if !course.entry_ids.contains(id) {
                    course.entry_ids.push(*id);
                }
            }
            CourseUpdate::PullEntry(id) => course.entry_ids.retain(|e| e != id),
            CourseUpdate::SetDetails(details) => details.apply_to(course),
        }
    }
}

/// Persist a new course.
#[async_trait]
pub trait CourseInserter: Send + Sync {
    /// Insert a course document.
    async fn insert(&self, course: &Course) -> StoreResult<()>;
}

/// Find a course by ID.
#[async_trait]
pub trait CourseOneFinder: Send + Sync {
    /// Get a course by ID.
    async fn find_one_by_id(&self, id: &CourseId) -> StoreResult<Option<Course>>;
}

/// Find many courses.
#[async_trait]
pub trait CourseManyFinder: Send + Sync {
    /// Get every course that passes `filter`, in store order.
    async fn find_many(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>>;
}

/// Update one course.
#[async_trait]
pub trait CourseUpdater: Send + Sync {
    /// Apply `update` atomically. Returns the updated course, or `None` if
    /// no course has that ID.
    async fn update(&self, id: &CourseId, update: &CourseUpdate) -> StoreResult<Option<Course>>;
}

/// Lookup-then-update access used by the entry lifecycle.
pub trait CourseFindUpdater: CourseOneFinder + CourseUpdater {}

impl<T> CourseFindUpdater for T where T: CourseOneFinder + CourseUpdater {}

/// The full course collection.
pub trait CourseRepository:
    CourseInserter + CourseOneFinder + CourseManyFinder + CourseUpdater
{
}

impl<T> CourseRepository for T where
    T: CourseInserter + CourseOneFinder + CourseManyFinder + CourseUpdater
{
}

// ============================================================================
// Course entries
// ============================================================================

/// Selects entries for [`CourseEntryManyFinder::find_many`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryFilter {
    /// Entries owned by the course.
    Course(CourseId),
}

impl EntryFilter {
    /// Whether `entry` passes the filter.
    pub fn matches(&self, entry: &CourseEntry) -> bool {
        match self {
            EntryFilter::Course(course_id) => entry.course_id == *course_id,
        }
    }
}

/// Persist a new entry.
#[async_trait]
pub trait CourseEntryInserter: Send + Sync {
    /// Insert an entry document.
    async fn insert(&self, entry: &CourseEntry) -> StoreResult<()>;
}

/// Find an entry by ID.
#[async_trait]
pub trait CourseEntryOneFinder: Send + Sync {
    /// Get an entry by ID.
    async fn find_one_by_id(&self, id: &EntryId) -> StoreResult<Option<CourseEntry>>;
}

/// Find many entries.
#[async_trait]
pub trait CourseEntryManyFinder: Send + Sync {
    /// Get every entry that passes `filter`, in store order.
    async fn find_many(&self, filter: &EntryFilter) -> StoreResult<Vec<CourseEntry>>;
}

/// Update one entry.
#[async_trait]
pub trait CourseEntryUpdater: Send + Sync {
    /// Apply field updates. Returns the updated entry, or `None` if missing.
    async fn update(
        &self,
        id: &EntryId,
        update: &CourseEntryUpdate,
    ) -> StoreResult<Option<CourseEntry>>;
}

/// Delete one entry.
#[async_trait]
pub trait CourseEntryDeleter: Send + Sync {
    /// Delete an entry. Returns false if it did not exist.
    async fn delete(&self, id: &EntryId) -> StoreResult<bool>;
}

/// The full course entry collection.
pub trait CourseEntryRepository:
    CourseEntryInserter
    + CourseEntryOneFinder
    + CourseEntryManyFinder
    + CourseEntryUpdater
    + CourseEntryDeleter
{
}

impl<T> CourseEntryRepository for T where
    T: CourseEntryInserter
        + CourseEntryOneFinder
        + CourseEntryManyFinder
        + CourseEntryUpdater
        + CourseEntryDeleter
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn empty_course() -> Course {
        Course {
            id: CourseId::new(),
            title: "Course".to_string(),
            description: String::new(),
            labels: vec![],
            members: vec![],
            entry_ids: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_members_is_set_like() {
        let mut course = empty_course();
        let a = UserId::new();
        let b = UserId::new();

        CourseUpdate::AddMembers(vec![a, b, a]).apply_to(&mut course);
        CourseUpdate::AddMembers(vec![b]).apply_to(&mut course);

        assert_eq!(course.members, vec![a, b]);
    }

    #[test]
    fn test_remove_members_repeated_is_noop() {
        let mut course = empty_course();
        let a = UserId::new();
        let b = UserId::new();
        course.members = vec![a, b];

        CourseUpdate::RemoveMembers(vec![a]).apply_to(&mut course);
        CourseUpdate::RemoveMembers(vec![a]).apply_to(&mut course);

        assert_eq!(course.members, vec![b]);
    }

    #[test]
    fn test_push_and_pull_entry() {
        let mut course = empty_course();
        let e1 = EntryId::new();
        let e2 = EntryId::new();

        CourseUpdate::PushEntry(e1).apply_to(&mut course);
        CourseUpdate::PushEntry(e2).apply_to(&mut course);
        CourseUpdate::PushEntry(e2).apply_to(&mut course);
        assert_eq!(course.entry_ids, vec![e1, e2]);

        CourseUpdate::PullEntry(e1).apply_to(&mut course);

        assert_eq!(course.entry_ids, vec![e2]);
    }

    #[test]
    fn test_course_filter_member() {
        let mut course = empty_course();
        let user = UserId::new();
        assert!(CourseFilter::All.matches(&course));
        assert!(!CourseFilter::Member(user).matches(&course));
        course.members.push(user);
        assert!(CourseFilter::Member(user).matches(&course));
    }

    #[test]
    fn test_store_error_display() {
        assert_eq!(
            StoreError::Conflict("users.email".to_string()).to_string(),
            "conflict: users.email"
        );
    }
}
