//! SQLite course repository for eduboard.
//!
//! Array updates are single UPDATE statements over the JSON columns, so a
//! push or pull on one course is atomic without an explicit transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool};

use crate::course::Course;

use super::traits::{
    CourseFilter, CourseInserter, CourseManyFinder, CourseOneFinder, CourseUpdate, CourseUpdater,
    StoreError, StoreResult,
};
use super::{dedup_ids, CourseId, EntryId, UserId};

const COURSE_COLUMNS: &str = "id, title, description, labels, members, entry_ids, created_at";

/// Repository for the courses collection.
#[derive(Clone)]
pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct CourseRow {
    id: String,
    title: String,
    description: String,
    labels: String,
    members: String,
    entry_ids: String,
    created_at: DateTime<Utc>,
}

impl CourseRow {
    fn into_course(self) -> StoreResult<Course> {
        let id = self
            .id
            .parse::<CourseId>()
            .map_err(|e| StoreError::Serialization(format!("course id {}: {}", self.id, e)))?;

        Ok(Course {
            id,
            title: self.title,
            description: self.description,
            labels: serde_json::from_str(&self.labels)?,
            members: serde_json::from_str::<Vec<UserId>>(&self.members)?,
            entry_ids: serde_json::from_str::<Vec<EntryId>>(&self.entry_ids)?,
            created_at: self.created_at,
        })
    }
}

impl SqliteCourseRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_updated(&self, sql: &str, arg: String, id: &CourseId) -> StoreResult<Option<Course>> {
        let row: Option<CourseRow> = sqlx::query_as(sql)
            .bind(arg)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(CourseRow::into_course).transpose()
    }
}

#[async_trait]
impl CourseInserter for SqliteCourseRepository {
    async fn insert(&self, course: &Course) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO courses (id, title, description, labels, members, entry_ids, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(course.id.to_string())
        .bind(&course.title)
        .bind(&course.description)
        .bind(serde_json::to_string(&course.labels)?)
        .bind(serde_json::to_string(&course.members)?)
        .bind(serde_json::to_string(&course.entry_ids)?)
        .bind(course.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CourseOneFinder for SqliteCourseRepository {
    async fn find_one_by_id(&self, id: &CourseId) -> StoreResult<Option<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?");
        let row: Option<CourseRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(CourseRow::into_course).transpose()
    }
}

#[async_trait]
impl CourseManyFinder for SqliteCourseRepository {
    async fn find_many(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>> {
        let rows: Vec<CourseRow> = match filter {
            CourseFilter::All => {
                let sql = format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY rowid");
                sqlx::query_as(&sql).fetch_all(&self.pool).await?
            }
            CourseFilter::Member(user_id) => {
                let sql = format!(
                    "SELECT {COURSE_COLUMNS} FROM courses
                     WHERE EXISTS (SELECT 1 FROM json_each(courses.members) WHERE value = ?)
                     ORDER BY rowid"
                );
                sqlx::query_as(&sql)
                    .bind(user_id.to_string())
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.into_iter().map(CourseRow::into_course).collect()
    }
}

#[async_trait]
impl CourseUpdater for SqliteCourseRepository {
    async fn update(&self, id: &CourseId, update: &CourseUpdate) -> StoreResult<Option<Course>> {
        match update {
            CourseUpdate::AddMembers(ids) => {
                let sql = format!(
                    "UPDATE courses SET members = (
                        SELECT json_group_array(value) FROM (
                            SELECT 0 AS part, key, value FROM json_each(courses.members)
                            UNION ALL
                            SELECT 1 AS part, key, value FROM json_each(?1)
                            WHERE value NOT IN (SELECT value FROM json_each(courses.members))
                            ORDER BY part, key
                        )
                    )
                    WHERE id = ?2
                    RETURNING {COURSE_COLUMNS}"
                );
                let ids = serde_json::to_string(&dedup_ids(ids))?;
                self.fetch_updated(&sql, ids, id).await
            }
            CourseUpdate::RemoveMembers(ids) => {
                let sql = format!(
                    "UPDATE courses SET members = (
                        SELECT json_group_array(value) FROM json_each(courses.members)
                        WHERE value NOT IN (SELECT value FROM json_each(?1))
                    )
                    WHERE id = ?2
                    RETURNING {COURSE_COLUMNS}"
                );
                self.fetch_updated(&sql, serde_json::to_string(ids)?, id).await
            }
            CourseUpdate::PushEntry(entry_id) => {
                let sql = format!(
                    "UPDATE courses SET entry_ids = CASE
                        WHEN EXISTS (SELECT 1 FROM json_each(courses.entry_ids) WHERE value = ?1)
                        THEN entry_ids
                        ELSE json_insert(entry_ids, '$[#]', ?1)
                    END
                    WHERE id = ?2
                    RETURNING {COURSE_COLUMNS}"
                );
                self.fetch_updated(&sql, entry_id.to_string(), id).await
            }
            CourseUpdate::PullEntry(entry_id) => {
                let sql = format!(
                    "UPDATE courses SET entry_ids = (
                        SELECT json_group_array(value) FROM json_each(courses.entry_ids)
                        WHERE value <> ?1
                    )
                    WHERE id = ?2
                    RETURNING {COURSE_COLUMNS}"
                );
                self.fetch_updated(&sql, entry_id.to_string(), id).await
            }
            CourseUpdate::SetDetails(details) => {
                if details.is_empty() {
                    return self.find_one_by_id(id).await;
                }

                let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE courses SET ");
                let mut separated = query.separated(", ");

                if let Some(ref title) = details.title {
                    separated.push("title = ");
                    separated.push_bind_unseparated(title.clone());
                }
                if let Some(ref description) = details.description {
                    separated.push("description = ");
                    separated.push_bind_unseparated(description.clone());
                }
                if let Some(ref labels) = details.labels {
                    separated.push("labels = ");
                    separated.push_bind_unseparated(serde_json::to_string(labels)?);
                }

                query.push(" WHERE id = ");
                query.push_bind(id.to_string());
                query.push(format!(" RETURNING {COURSE_COLUMNS}"));

                let row = query
                    .build_query_as::<CourseRow>()
                    .fetch_optional(&self.pool)
                    .await?;
                row.map(CourseRow::into_course).transpose()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::CourseDetailsUpdate;
    use crate::db::Database;

    async fn setup_repo() -> (Database, SqliteCourseRepository) {
        let db = Database::open_in_memory().await.unwrap();
        let repo = db.courses();
        (db, repo)
    }

    fn sample_course(title: &str) -> Course {
        Course {
            id: CourseId::new(),
            title: title.to_string(),
            description: "desc".to_string(),
            labels: vec!["math".to_string()],
            members: vec![],
            entry_ids: vec![],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_course() {
        let (_db, repo) = setup_repo().await;
        let course = sample_course("Course 1");
        repo.insert(&course).await.unwrap();

        let found = repo.find_one_by_id(&course.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Course 1");
        assert_eq!(found.labels, vec!["math".to_string()]);
        assert!(found.entry_ids.is_empty());

        assert!(repo.find_one_by_id(&CourseId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_members_set_semantics_and_order() {
        let (_db, repo) = setup_repo().await;
        let course = sample_course("Course 1");
        repo.insert(&course).await.unwrap();

        let a = UserId::new();
        let b = UserId::new();
        let c = UserId::new();

        repo.update(&course.id, &CourseUpdate::AddMembers(vec![a, b, a]))
            .await
            .unwrap();
        let updated = repo
            .update(&course.id, &CourseUpdate::AddMembers(vec![b, c]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.members, vec![a, b, c]);
    }

    #[tokio::test]
    async fn test_remove_members() {
        let (_db, repo) = setup_repo().await;
        let a = UserId::new();
        let b = UserId::new();
        let mut course = sample_course("Course 1");
        course.members = vec![a, b];
        repo.insert(&course).await.unwrap();

        let updated = repo
            .update(&course.id, &CourseUpdate::RemoveMembers(vec![a, UserId::new()]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.members, vec![b]);

        let updated = repo
            .update(&course.id, &CourseUpdate::RemoveMembers(vec![b]))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.members.is_empty());
    }

    #[tokio::test]
    async fn test_push_and_pull_entry() {
        let (_db, repo) = setup_repo().await;
        let course = sample_course("Course 1");
        repo.insert(&course).await.unwrap();

        let e1 = EntryId::new();
        let e2 = EntryId::new();
        repo.update(&course.id, &CourseUpdate::PushEntry(e1)).await.unwrap();
        repo.update(&course.id, &CourseUpdate::PushEntry(e1)).await.unwrap();
        let updated = repo
            .update(&course.id, &CourseUpdate::PushEntry(e2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.entry_ids, vec![e1, e2]);

        let updated = repo
            .update(&course.id, &CourseUpdate::PullEntry(e1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.entry_ids, vec![e2]);
    }

    #[tokio::test]
    async fn test_update_unknown_course_returns_none() {
        let (_db, repo) = setup_repo().await;
        let result = repo
            .update(&CourseId::new(), &CourseUpdate::PushEntry(EntryId::new()))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_member_filter() {
        let (_db, repo) = setup_repo().await;
        let user = UserId::new();
        let mut mine = sample_course("Mine");
        mine.members = vec![user];
        repo.insert(&mine).await.unwrap();
        repo.insert(&sample_course("Other")).await.unwrap();

        let all = repo.find_many(&CourseFilter::All).await.unwrap();
        assert_eq!(all.len(), 2);

        let found = repo.find_many(&CourseFilter::Member(user)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Mine");
    }

    #[tokio::test]
    async fn test_set_details() {
        let (_db, repo) = setup_repo().await;
        let course = sample_course("Course 1");
        repo.insert(&course).await.unwrap();

        let update = CourseDetailsUpdate {
            title: Some("Renamed".to_string()),
            labels: Some(vec![]),
            ..Default::default()
        };
        let updated = repo
            .update(&course.id, &CourseUpdate::SetDetails(update))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, "desc");
        assert!(updated.labels.is_empty());
    }
}
