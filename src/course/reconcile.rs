//! Entry-index reconciliation.
//!
//! Repairs the two states an interrupted create or delete can leave behind:
//! orphan entries (stored, not indexed) are pushed into the index, and
//! dangling references (indexed, not stored) are pulled from it. Running the
//! sweep twice changes nothing the second time.

use std::sync::Arc;

use tracing::{info, warn};

use crate::db::{
    CourseEntryManyFinder, CourseFilter, CourseId, CourseRepository, CourseUpdate, EntryFilter,
    EntryId,
};
use crate::error::StoreResultExt;
use crate::{EduboardError, Result};

/// What a reconciliation changed for one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Course that was checked.
    pub course_id: CourseId,
    /// Entries that existed but were missing from the index.
    pub orphans_indexed: Vec<EntryId>,
    /// Index IDs with no matching entry.
    pub dangling_removed: Vec<EntryId>,
}

impl ReconcileReport {
    /// True when nothing needed repair.
    pub fn is_clean(&self) -> bool {
        self.orphans_indexed.is_empty() && self.dangling_removed.is_empty()
    }
}

/// Brings course entry-indexes back in line with the entry collection.
#[derive(Clone)]
pub struct Reconciler {
    courses: Arc<dyn CourseRepository>,
    entries: Arc<dyn CourseEntryManyFinder>,
}

impl Reconciler {
    /// Create a reconciler over the course and entry collections.
    pub fn new(courses: Arc<dyn CourseRepository>, entries: Arc<dyn CourseEntryManyFinder>) -> Self {
        Self { courses, entries }
    }

    /// Reconcile a single course.
    pub async fn reconcile(&self, course_id: &CourseId) -> Result<ReconcileReport> {
        let course = self
            .courses
            .find_one_by_id(course_id)
            .await
            .context("finding course")?
            .ok_or(EduboardError::CourseNotFound(*course_id))?;

        let entries = self
            .entries
            .find_many(&EntryFilter::Course(*course_id))
            .await
            .context("finding course entries")?;

        let orphans: Vec<EntryId> = entries
            .iter()
            .map(|e| e.id)
            .filter(|id| !course.indexes(id))
            .collect();
        let dangling: Vec<EntryId> = course
            .entry_ids
            .iter()
            .copied()
            .filter(|id| !entries.iter().any(|e| e.id == *id))
            .collect();

        for id in &orphans {
            self.courses
                .update(course_id, &CourseUpdate::PushEntry(*id))
                .await
                .context("indexing orphan entry")?;
        }
        for id in &dangling {
            self.courses
                .update(course_id, &CourseUpdate::PullEntry(*id))
                .await
                .context("removing dangling index reference")?;
        }

        let report = ReconcileReport {
            course_id: *course_id,
            orphans_indexed: orphans,
            dangling_removed: dangling,
        };
        if !report.is_clean() {
            info!(
                course_id = %course_id,
                orphans = report.orphans_indexed.len(),
                dangling = report.dangling_removed.len(),
                "Course entry index repaired"
            );
        }
        Ok(report)
    }

    /// Reconcile every course. A failing course is logged and skipped.
    pub async fn reconcile_all(&self) -> Result<Vec<ReconcileReport>> {
        let courses = self
            .courses
            .find_many(&CourseFilter::All)
            .await
            .context("listing courses")?;

        let mut reports = Vec::with_capacity(courses.len());
        for course in courses {
            match self.reconcile(&course.id).await {
                Ok(report) => reports.push(report),
                Err(e) => warn!(course_id = %course.id, error = %e, "Reconciliation failed"),
            }
        }
        Ok(reports)
    }
}
