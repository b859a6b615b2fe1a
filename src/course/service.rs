//! Course retrieval and membership service.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::auth::validation::validate_course_title;
use crate::db::{
    dedup_ids, CourseEntryManyFinder, CourseFilter, CourseId, CourseRepository, CourseUpdate,
    EntryFilter, User, UserBatchFinder, UserId,
};
use crate::error::StoreResultExt;
use crate::{EduboardError, Result};

use super::types::{AggregatedCourse, Course, CourseDetailsUpdate, NewCourse};

/// Service for course retrieval, creation and membership.
#[derive(Clone)]
pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
    entries: Arc<dyn CourseEntryManyFinder>,
}

impl CourseService {
    /// Create a new course service.
    pub fn new(courses: Arc<dyn CourseRepository>, entries: Arc<dyn CourseEntryManyFinder>) -> Self {
        Self { courses, entries }
    }

    /// Attach the course's entries.
    ///
    /// An empty entry-index means there is nothing to fetch, so the entry
    /// store is not queried. Index IDs whose entry no longer exists are
    /// simply absent from the result.
    async fn aggregate(&self, course: Course) -> Result<AggregatedCourse> {
        if course.entry_ids.is_empty() {
            return Ok(AggregatedCourse::without_entries(course));
        }

        let entries = self
            .entries
            .find_many(&EntryFilter::Course(course.id))
            .await
            .context("finding course entries")?;

        Ok(AggregatedCourse { course, entries })
    }

    async fn find_course(&self, id: &CourseId) -> Result<Course> {
        self.courses
            .find_one_by_id(id)
            .await
            .context("finding course")?
            .ok_or(EduboardError::CourseNotFound(*id))
    }

    /// List all courses, without entries.
    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        self.courses
            .find_many(&CourseFilter::All)
            .await
            .context("listing courses")
    }

    /// Get a course with its entries attached.
    pub async fn get_course(&self, id: &CourseId) -> Result<AggregatedCourse> {
        let course = self.find_course(id).await?;
        self.aggregate(course).await
    }

    /// Get every course the user is a member of, each with its entries.
    pub async fn get_courses_by_member(&self, user_id: &UserId) -> Result<Vec<AggregatedCourse>> {
        let courses = self
            .courses
            .find_many(&CourseFilter::Member(*user_id))
            .await
            .context("finding courses by member")?;

        let mut aggregated = Vec::with_capacity(courses.len());
        for course in courses {
            aggregated.push(self.aggregate(course).await?);
        }
        Ok(aggregated)
    }

    /// Resolve a course's members into user records.
    pub async fn get_members(
        &self,
        id: &CourseId,
        directory: &dyn UserBatchFinder,
    ) -> Result<Vec<User>> {
        let course = self.find_course(id).await?;
        if course.members.is_empty() {
            return Ok(Vec::new());
        }

        directory
            .find_by_ids(&course.members)
            .await
            .context("finding course members")
    }

    /// Add users to a course. Users already on the course are skipped.
    pub async fn add_members(&self, id: &CourseId, member_ids: &[UserId]) -> Result<Course> {
        let update = CourseUpdate::AddMembers(dedup_ids(member_ids));
        let course = self
            .courses
            .update(id, &update)
            .await
            .context("adding course members")?
            .ok_or(EduboardError::CourseNotFound(*id))?;

        info!(course_id = %id, count = member_ids.len(), "Course members added");
        Ok(course)
    }

    /// Remove users from a course. Users not on the course are ignored.
    pub async fn remove_members(&self, id: &CourseId, member_ids: &[UserId]) -> Result<Course> {
        let update = CourseUpdate::RemoveMembers(member_ids.to_vec());
        let course = self
            .courses
            .update(id, &update)
            .await
            .context("removing course members")?
            .ok_or(EduboardError::CourseNotFound(*id))?;

        info!(course_id = %id, count = member_ids.len(), "Course members removed");
        Ok(course)
    }

    /// Create a course.
    ///
    /// Only the title is required. The creation timestamp is assigned here
    /// and the entry-index always starts empty.
    pub async fn create_course(&self, new_course: NewCourse) -> Result<Course> {
        validate_course_title(&new_course.title)?;

        let course = Course {
            id: CourseId::new(),
            title: new_course.title.trim().to_string(),
            description: new_course.description,
            labels: new_course.labels,
            members: dedup_ids(&new_course.members),
            entry_ids: Vec::new(),
            created_at: Utc::now(),
        };

        self.courses
            .insert(&course)
            .await
            .context("inserting course")?;

        info!(course_id = %course.id, title = %course.title, "Course created");
        Ok(course)
    }

    /// Update a course's title, description or labels.
    pub async fn update_course_details(
        &self,
        id: &CourseId,
        mut update: CourseDetailsUpdate,
    ) -> Result<Course> {
        if let Some(ref title) = update.title {
            validate_course_title(title)?;
            update.title = Some(title.trim().to_string());
        }
        if update.is_empty() {
            return self.find_course(id).await;
        }

        self.courses
            .update(id, &CourseUpdate::SetDetails(update))
            .await
            .context("updating course details")?
            .ok_or(EduboardError::CourseNotFound(*id))
    }
}
