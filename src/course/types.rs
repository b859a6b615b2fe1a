//! Course types for eduboard.

use chrono::{DateTime, Utc};

use crate::db::{CourseId, EntryId, UserId};

use super::CourseEntry;

/// Course entity as persisted.
///
/// `entry_ids` is the denormalized entry-index. The entries themselves are
/// never stored on the course; see [`AggregatedCourse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    /// Unique course ID.
    pub id: CourseId,
    /// Course title.
    pub title: String,
    /// Course description.
    pub description: String,
    /// Label tags.
    pub labels: Vec<String>,
    /// Member user IDs.
    pub members: Vec<UserId>,
    /// Entry-index: IDs of the entries belonging to this course.
    pub entry_ids: Vec<EntryId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Whether the given user is a member.
    pub fn has_member(&self, user_id: &UserId) -> bool {
        self.members.contains(user_id)
    }

    /// Whether the entry-index lists the given entry.
    pub fn indexes(&self, entry_id: &EntryId) -> bool {
        self.entry_ids.contains(entry_id)
    }
}

/// Data for creating a new course.
#[derive(Debug, Clone, Default)]
pub struct NewCourse {
    /// Course title (required).
    pub title: String,
    /// Course description.
    pub description: String,
    /// Label tags.
    pub labels: Vec<String>,
    /// Initial member user IDs.
    pub members: Vec<UserId>,
}

impl NewCourse {
    /// Create a new course with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the labels.
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Set the initial members.
    pub fn with_members(mut self, members: Vec<UserId>) -> Self {
        self.members = members;
        self
    }
}

/// Field update for a course's descriptive data.
///
/// Only fields that are set will be modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDetailsUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New labels.
    pub labels: Option<Vec<String>>,
}

impl CourseDetailsUpdate {
    /// Check if the update is empty (no fields to update).
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.labels.is_none()
    }

    /// Apply the update to a course in place.
    pub fn apply_to(&self, course: &mut Course) {
        if let Some(ref title) = self.title {
            course.title = title.clone();
        }
        if let Some(ref description) = self.description {
            course.description = description.clone();
        }
        if let Some(ref labels) = self.labels {
            course.labels = labels.clone();
        }
    }
}

/// A course with its entries attached for a single response.
///
/// This is the read-time aggregation; it is never written back to the store.
#[derive(Debug, Clone)]
pub struct AggregatedCourse {
    /// The stored course.
    pub course: Course,
    /// Entries found for the course, in store order.
    pub entries: Vec<CourseEntry>,
}

impl AggregatedCourse {
    /// Aggregate with no entries attached.
    pub fn without_entries(course: Course) -> Self {
        Self {
            course,
            entries: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_course() -> Course {
        Course {
            id: CourseId::new(),
            title: "Course 1".to_string(),
            description: String::new(),
            labels: vec![],
            members: vec![],
            entry_ids: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_details_update_is_empty() {
        assert!(CourseDetailsUpdate::default().is_empty());
        let update = CourseDetailsUpdate {
            title: Some("t".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_details_update_apply_partial() {
        let mut course = sample_course();
        course.description = "keep me".to_string();

        CourseDetailsUpdate {
            labels: Some(vec!["math".to_string()]),
            ..Default::default()
        }
        .apply_to(&mut course);

        assert_eq!(course.title, "Course 1");
        assert_eq!(course.description, "keep me");
        assert_eq!(course.labels, vec!["math".to_string()]);
    }

    #[test]
    fn test_membership_and_index_checks() {
        let mut course = sample_course();
        let user = UserId::new();
        let entry = EntryId::new();
        course.members.push(user);
        course.entry_ids.push(entry);

        assert!(course.has_member(&user));
        assert!(!course.has_member(&UserId::new()));
        assert!(course.indexes(&entry));
    }
}
