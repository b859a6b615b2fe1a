//! Course entry types for eduboard.

use chrono::{DateTime, Utc};

use crate::db::{CourseId, EntryId};

/// A dated, illustrated post within a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseEntry {
    /// Unique entry ID.
    pub id: EntryId,
    /// Owning course.
    pub course_id: CourseId,
    /// Message body.
    pub message: String,
    /// Picture URIs, in display order.
    pub pictures: Vec<String>,
    /// Date the entry is authored for.
    pub date: DateTime<Utc>,
    /// When the entry was stored.
    pub created_at: DateTime<Utc>,
    /// Whether the entry is visible to members.
    pub published: bool,
}

/// Data for creating a new course entry.
#[derive(Debug, Clone, Default)]
pub struct NewCourseEntry {
    /// Message body.
    pub message: String,
    /// Picture URIs.
    pub pictures: Vec<String>,
    /// Authored date; defaults to the creation time.
    pub date: Option<DateTime<Utc>>,
    /// Published flag.
    pub published: bool,
}

impl NewCourseEntry {
    /// Create a new entry with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set the picture URIs.
    pub fn with_pictures(mut self, pictures: Vec<String>) -> Self {
        self.pictures = pictures;
        self
    }

    /// Set the authored date.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Mark the entry as published.
    pub fn published(mut self) -> Self {
        self.published = true;
        self
    }
}

/// Update data for an existing entry.
///
/// Only fields that are set will be modified. The owning course never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseEntryUpdate {
    /// New message body.
    pub message: Option<String>,
    /// New picture URIs.
    pub pictures: Option<Vec<String>>,
    /// New authored date.
    pub date: Option<DateTime<Utc>>,
    /// New published flag.
    pub published: Option<bool>,
}

impl CourseEntryUpdate {
    /// Check if the update is empty (no fields to update).
    pub fn is_empty(&self) -> bool {
        self.message.is_none()
            && self.pictures.is_none()
            && self.date.is_none()
            && self.published.is_none()
    }

    /// Apply the update to an entry in place.
    pub fn apply_to(&self, entry: &mut CourseEntry) {
        if let Some(ref message) = self.message {
            entry.message = message.clone();
        }
        if let Some(ref pictures) = self.pictures {
            entry.pictures = pictures.clone();
        }
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(published) = self.published {
            entry.published = published;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_update_apply() {
        let now = Utc::now();
        let mut entry = CourseEntry {
            id: EntryId::new(),
            course_id: CourseId::new(),
            message: "hi".to_string(),
            pictures: vec![],
            date: now,
            created_at: now,
            published: false,
        };
        let original_course = entry.course_id;

        CourseEntryUpdate {
            message: Some("hello".to_string()),
            published: Some(true),
            ..Default::default()
        }
        .apply_to(&mut entry);

        assert_eq!(entry.message, "hello");
        assert!(entry.published);
        assert!(entry.pictures.is_empty());
        assert_eq!(entry.course_id, original_course);
    }

    #[test]
    fn test_entry_update_is_empty() {
        assert!(CourseEntryUpdate::default().is_empty());
        assert!(!CourseEntryUpdate {
            published: Some(false),
            ..Default::default()
        }
        .is_empty());
    }
}
