//! Database module for eduboard.
//!
//! Identity types, the user model, the capability-scoped store traits and
//! the two store backends: [`MemoryStore`] and the SQLite [`Database`].

mod id;
mod memory;
mod traits;
mod user;

#[cfg(feature = "sqlite")]
mod course_repository;
#[cfg(feature = "sqlite")]
mod entry_repository;
#[cfg(feature = "sqlite")]
mod repository;
#[cfg(feature = "sqlite")]
mod schema;

pub(crate) use id::dedup_ids;
pub use id::{CourseId, EntryId, UserId};
pub use memory::MemoryStore;
pub use traits::{
    CourseEntryDeleter, CourseEntryInserter, CourseEntryManyFinder, CourseEntryOneFinder,
    CourseEntryRepository, CourseEntryUpdater, CourseFilter, CourseFindUpdater, CourseInserter,
    CourseManyFinder, CourseOneFinder, CourseRepository, CourseUpdate, CourseUpdater, EntryFilter,
    StoreError, StoreResult, UserBatchFinder, UserDirectory, UserEmailFinder, UserFinder,
    UserSessionFinder, UserSessionUpdater, UserStorer,
};
pub use user::{NewUser, Session, SessionToken, User};

#[cfg(feature = "sqlite")]
pub use course_repository::SqliteCourseRepository;
#[cfg(feature = "sqlite")]
pub use entry_repository::SqliteEntryRepository;
#[cfg(feature = "sqlite")]
pub use repository::SqliteUserRepository;
#[cfg(feature = "sqlite")]
pub use schema::MIGRATIONS;

#[cfg(feature = "sqlite")]
pub use sqlite::{Database, DbPool};

#[cfg(feature = "sqlite")]
mod sqlite {
    use std::path::Path;
    use std::str::FromStr;
    use std::time::Duration;

    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use tracing::{debug, info};

    use super::schema::MIGRATIONS;
    use super::{SqliteCourseRepository, SqliteEntryRepository, SqliteUserRepository, StoreError};
    use crate::error::StoreResultExt;
    use crate::Result;

    /// Connection pool type used by the SQLite repositories.
    pub type DbPool = SqlitePool;

    /// Database wrapper for managing the SQLite pool and migrations.
    #[derive(Clone)]
    pub struct Database {
        pool: SqlitePool,
    }

    impl Database {
        /// Open a database at the specified path.
        ///
        /// If the database file doesn't exist, it will be created.
        /// Migrations are automatically applied.
        pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref();
            info!("Opening database at {:?}", path);

            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5));

            let pool = SqlitePoolOptions::new()
                .max_connections(8)
                .connect_with(options)
                .await
                .map_err(StoreError::from)
                .context("opening database")?;

            let db = Self { pool };
            db.migrate().await?;
            Ok(db)
        }

        /// Open an in-memory database for testing.
        ///
        /// Every connection to `:memory:` is a separate database, so the pool
        /// is pinned to a single connection that is never recycled.
        pub async fn open_in_memory() -> Result<Self> {
            debug!("Opening in-memory database");
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(StoreError::from)
                .context("parsing in-memory database url")?;

            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
                .map_err(StoreError::from)
                .context("opening in-memory database")?;

            let db = Self { pool };
            db.migrate().await?;
            Ok(db)
        }

        /// Get a reference to the connection pool.
        pub fn pool(&self) -> &SqlitePool {
            &self.pool
        }

        /// User collection backed by this database.
        pub fn users(&self) -> SqliteUserRepository {
            SqliteUserRepository::new(self.pool.clone())
        }

        /// Course collection backed by this database.
        pub fn courses(&self) -> SqliteCourseRepository {
            SqliteCourseRepository::new(self.pool.clone())
        }

        /// Course entry collection backed by this database.
        pub fn entries(&self) -> SqliteEntryRepository {
            SqliteEntryRepository::new(self.pool.clone())
        }

        /// Get the current schema version.
        pub async fn schema_version(&self) -> Result<i64> {
            if !self.table_exists("schema_version").await? {
                return Ok(0);
            }

            let version: i64 =
                sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(StoreError::from)
                    .context("reading schema version")?;

            Ok(version)
        }

        /// Apply pending migrations.
        async fn migrate(&self) -> Result<()> {
            let current_version = self.schema_version().await?;

            if current_version as usize >= MIGRATIONS.len() {
                debug!("Database is up to date (version {})", current_version);
                return Ok(());
            }

            info!(
                "Migrating database from version {} to {}",
                current_version,
                MIGRATIONS.len()
            );

            sqlx::query(
                "CREATE TABLE IF NOT EXISTS schema_version (
                    version     INTEGER PRIMARY KEY,
                    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
                )",
            )
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)
            .context("creating schema_version table")?;

            for (i, migration) in MIGRATIONS.iter().enumerate().skip(current_version as usize) {
                let version = (i + 1) as i64;
                info!("Applying migration v{}", version);

                let mut tx = self
                    .pool
                    .begin()
                    .await
                    .map_err(StoreError::from)
                    .context("starting migration")?;

                sqlx::raw_sql(migration)
                    .execute(&mut *tx)
                    .await
                    .map_err(StoreError::from)
                    .context("applying migration")?;

                sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                    .bind(version)
                    .execute(&mut *tx)
                    .await
                    .map_err(StoreError::from)
                    .context("recording migration")?;

                tx.commit()
                    .await
                    .map_err(StoreError::from)
                    .context("committing migration")?;
                debug!("Migration v{} applied successfully", version);
            }

            info!(
                "Database migration complete (now at version {})",
                MIGRATIONS.len()
            );
            Ok(())
        }

        /// Check if a table exists.
        pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
            )
            .bind(table_name)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from)
            .context("checking table existence")?;
            Ok(exists)
        }
    }

    impl std::fmt::Debug for Database {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Database").finish()
        }
    }

}
