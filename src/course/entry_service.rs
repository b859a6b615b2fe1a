//! Course entry lifecycle.
//!
//! An entry lives in two places: its own document in the entry collection
//! and its ID in the owning course's entry-index. The store offers no
//! transaction across the two, so every write touches the entry document
//! first and the index second:
//!
//! - create: insert entry, then push its ID. A failure in between leaves an
//!   orphan entry (stored but not indexed).
//! - delete: delete entry, then pull its ID. A failure in between leaves a
//!   dangling reference, which reads already skip.
//!
//! When the second write fails the error is returned, but the caller cannot
//! tell from it that the first write committed. Both states are repaired by
//! the [`Reconciler`](super::Reconciler).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::db::{CourseEntryRepository, CourseFindUpdater, CourseId, CourseUpdate, EntryId};
use crate::error::StoreResultExt;
use crate::file::Uploader;
use crate::{EduboardError, Result};

use super::entry::{CourseEntry, CourseEntryUpdate, NewCourseEntry};

/// Service for creating, updating and deleting course entries.
#[derive(Clone)]
pub struct CourseEntryService {
    courses: Arc<dyn CourseFindUpdater>,
    entries: Arc<dyn CourseEntryRepository>,
    uploader: Arc<dyn Uploader>,
}

impl CourseEntryService {
    /// Create a new entry service.
    pub fn new(
        courses: Arc<dyn CourseFindUpdater>,
        entries: Arc<dyn CourseEntryRepository>,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        Self {
            courses,
            entries,
            uploader,
        }
    }

    async fn ensure_course(&self, course_id: &CourseId) -> Result<()> {
        self.courses
            .find_one_by_id(course_id)
            .await
            .context("finding course")?
            .ok_or(EduboardError::CourseNotFound(*course_id))?;
        Ok(())
    }

    /// Load an entry and check that `course_id` owns it.
    async fn owned_entry(&self, entry_id: &EntryId, course_id: &CourseId) -> Result<CourseEntry> {
        let entry = self
            .entries
            .find_one_by_id(entry_id)
            .await
            .context("finding course entry")?
            .ok_or(EduboardError::EntryNotFound(*entry_id))?;

        if entry.course_id != *course_id {
            warn!(
                entry_id = %entry_id,
                owner = %entry.course_id,
                claimed = %course_id,
                "Entry addressed through a course that does not own it"
            );
            return Err(EduboardError::EntryCourseMismatch {
                entry: *entry_id,
                course: *course_id,
            });
        }

        Ok(entry)
    }

    /// Create an entry in a course.
    ///
    /// The entry is stored before its ID is pushed into the course index.
    pub async fn create_entry(
        &self,
        new_entry: NewCourseEntry,
        course_id: &CourseId,
    ) -> Result<CourseEntry> {
        self.ensure_course(course_id).await?;

        let now = Utc::now();
        let entry = CourseEntry {
            id: EntryId::new(),
            course_id: *course_id,
            message: new_entry.message,
            pictures: new_entry.pictures,
            date: new_entry.date.unwrap_or(now),
            created_at: now,
            published: new_entry.published,
        };

        self.entries
            .insert(&entry)
            .await
            .context("inserting course entry")?;

        let pushed = match self
            .courses
            .update(course_id, &CourseUpdate::PushEntry(entry.id))
            .await
        {
            Ok(pushed) => pushed,
            Err(e) => {
                warn!(
                    entry_id = %entry.id,
                    course_id = %course_id,
                    error = %e,
                    "Entry stored but not indexed"
                );
                return Err(EduboardError::storage("pushing entry into course index", e));
            }
        };

        if pushed.is_none() {
            // Course vanished between lookup and push.
            warn!(entry_id = %entry.id, course_id = %course_id, "Entry stored but course is gone");
            return Err(EduboardError::CourseNotFound(*course_id));
        }

        info!(entry_id = %entry.id, course_id = %course_id, "Course entry created");
        Ok(entry)
    }

    /// Update an entry's fields after checking that `course_id` owns it.
    ///
    /// The entry-index is never touched.
    pub async fn update_entry(
        &self,
        entry_id: &EntryId,
        course_id: &CourseId,
        update: CourseEntryUpdate,
    ) -> Result<CourseEntry> {
        let entry = self.owned_entry(entry_id, course_id).await?;
        if update.is_empty() {
            return Ok(entry);
        }

        let updated = self
            .entries
            .update(entry_id, &update)
            .await
            .context("updating course entry")?
            .ok_or(EduboardError::EntryNotFound(*entry_id))?;

        info!(entry_id = %entry_id, course_id = %course_id, "Course entry updated");
        Ok(updated)
    }

    /// Delete an entry after checking that `course_id` owns it.
    ///
    /// The entry is deleted before its ID is pulled from the course index.
    pub async fn delete_entry(&self, entry_id: &EntryId, course_id: &CourseId) -> Result<()> {
        self.owned_entry(entry_id, course_id).await?;

        let deleted = self
            .entries
            .delete(entry_id)
            .await
            .context("deleting course entry")?;
        if !deleted {
            return Err(EduboardError::EntryNotFound(*entry_id));
        }

        match self
            .courses
            .update(course_id, &CourseUpdate::PullEntry(*entry_id))
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(entry_id = %entry_id, course_id = %course_id, "Entry deleted but course is gone");
            }
            Err(e) => {
                warn!(
                    entry_id = %entry_id,
                    course_id = %course_id,
                    error = %e,
                    "Entry deleted but still indexed"
                );
                return Err(EduboardError::storage("pulling entry from course index", e));
            }
        }

        info!(entry_id = %entry_id, course_id = %course_id, "Course entry deleted");
        Ok(())
    }

    /// Upload pictures for a course and return their URIs in input order.
    ///
    /// Files are named `{timestamp millis}_{position}`. The first failure
    /// aborts the call; files already written stay where they are.
    pub async fn upload_entry_assets(
        &self,
        files: &[Vec<u8>],
        course_id: &CourseId,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_course(course_id).await?;

        let stamp = timestamp.timestamp_millis();
        let mut uris = Vec::with_capacity(files.len());
        for (idx, bytes) in files.iter().enumerate() {
            let filename = format!("{stamp}_{idx}");
            let uri = self.uploader.upload(bytes, course_id, &filename).await?;
            debug!(course_id = %course_id, uri = %uri, "Entry asset uploaded");
            uris.push(uri);
        }

        Ok(uris)
    }
}
