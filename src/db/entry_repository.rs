//! SQLite course entry repository for eduboard.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool};

use crate::course::{CourseEntry, CourseEntryUpdate};

use super::traits::{
    CourseEntryDeleter, CourseEntryInserter, CourseEntryManyFinder, CourseEntryOneFinder,
    CourseEntryUpdater, EntryFilter, StoreError, StoreResult,
};
use super::{CourseId, EntryId};

const ENTRY_COLUMNS: &str = "id, course_id, message, pictures, date, created_at, published";

/// Repository for the course entries collection.
#[derive(Clone)]
pub struct SqliteEntryRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: String,
    course_id: String,
    message: String,
    pictures: String,
    date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    published: bool,
}

impl EntryRow {
    fn into_entry(self) -> StoreResult<CourseEntry> {
        let id = self
            .id
            .parse::<EntryId>()
            .map_err(|e| StoreError::Serialization(format!("entry id {}: {}", self.id, e)))?;
        let course_id = self.course_id.parse::<CourseId>().map_err(|e| {
            StoreError::Serialization(format!("course id {}: {}", self.course_id, e))
        })?;

        Ok(CourseEntry {
            id,
            course_id,
            message: self.message,
            pictures: serde_json::from_str(&self.pictures)?,
            date: self.date,
            created_at: self.created_at,
            published: self.published,
        })
    }
}

impl SqliteEntryRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseEntryInserter for SqliteEntryRepository {
    async fn insert(&self, entry: &CourseEntry) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO course_entries (id, course_id, message, pictures, date, created_at, published)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.course_id.to_string())
        .bind(&entry.message)
        .bind(serde_json::to_string(&entry.pictures)?)
        .bind(entry.date)
        .bind(entry.created_at)
        .bind(entry.published)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CourseEntryOneFinder for SqliteEntryRepository {
    async fn find_one_by_id(&self, id: &EntryId) -> StoreResult<Option<CourseEntry>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM course_entries WHERE id = ?");
        let row: Option<EntryRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(EntryRow::into_entry).transpose()
    }
}

#[async_trait]
impl CourseEntryManyFinder for SqliteEntryRepository {
    async fn find_many(&self, filter: &EntryFilter) -> StoreResult<Vec<CourseEntry>> {
        let EntryFilter::Course(course_id) = filter;
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM course_entries WHERE course_id = ? ORDER BY rowid"
        );
        let rows: Vec<EntryRow> = sqlx::query_as(&sql)
            .bind(course_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(EntryRow::into_entry).collect()
    }
}

#[async_trait]
impl CourseEntryUpdater for SqliteEntryRepository {
    async fn update(
        &self,
        id: &EntryId,
        update: &CourseEntryUpdate,
    ) -> StoreResult<Option<CourseEntry>> {
        if update.is_empty() {
            return self.find_one_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("UPDATE course_entries SET ");
        let mut separated = query.separated(", ");

        if let Some(ref message) = update.message {
            separated.push("message = ");
            separated.push_bind_unseparated(message.clone());
        }
        if let Some(ref pictures) = update.pictures {
            separated.push("pictures = ");
            separated.push_bind_unseparated(serde_json::to_string(pictures)?);
        }
        if let Some(date) = update.date {
            separated.push("date = ");
            separated.push_bind_unseparated(date);
        }
        if let Some(published) = update.published {
            separated.push("published = ");
            separated.push_bind_unseparated(published);
        }

        query.push(" WHERE id = ");
        query.push_bind(id.to_string());
        query.push(format!(" RETURNING {ENTRY_COLUMNS}"));

        let row = query
            .build_query_as::<EntryRow>()
            .fetch_optional(&self.pool)
            .await?;
        row.map(EntryRow::into_entry).transpose()
    }
}

#[async_trait]
impl CourseEntryDeleter for SqliteEntryRepository {
    async fn delete(&self, id: &EntryId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM course_entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
