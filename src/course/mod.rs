//! Course module for eduboard.
//!
//! This module provides courses, their dated entries and the services that
//! keep a course's entry-index consistent with the entries collection:
//! - `CourseService`: retrieval with entry aggregation, membership, creation
//! - `CourseEntryService`: entry create/update/delete and picture uploads
//! - `Reconciler`: repairs orphan entries and dangling index references

mod entry;
mod entry_service;
mod reconcile;
mod service;
mod types;

pub use entry::{CourseEntry, CourseEntryUpdate, NewCourseEntry};
pub use entry_service::CourseEntryService;
pub use reconcile::{ReconcileReport, Reconciler};
pub use service::CourseService;
pub use types::{AggregatedCourse, Course, CourseDetailsUpdate, NewCourse};

#[cfg(test)]
pub(crate) mod test_support;
