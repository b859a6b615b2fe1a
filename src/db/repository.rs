//! SQLite user repository for eduboard.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool};

use super::traits::{
    StoreError, StoreResult, UserBatchFinder, UserEmailFinder, UserFinder, UserSessionFinder,
    UserSessionUpdater, UserStorer,
};
use super::{Session, SessionToken, User, UserId};

const USER_COLUMNS: &str =
    "id, email, name, surname, password_hash, session_token, session_expires_at, created_at";

/// Repository for the users collection.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    surname: String,
    password_hash: String,
    session_token: Option<String>,
    session_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> StoreResult<User> {
        let id = self
            .id
            .parse::<UserId>()
            .map_err(|e| StoreError::Serialization(format!("user id {}: {}", self.id, e)))?;

        let session = match (self.session_token, self.session_expires_at) {
            (Some(token), Some(expires_at)) => Some(Session {
                token: SessionToken::new(token),
                expires_at,
            }),
            _ => None,
        };

        Ok(User {
            id,
            name: self.name,
            surname: self.surname,
            email: self.email,
            password_hash: self.password_hash,
            session,
            created_at: self.created_at,
        })
    }
}

impl SqliteUserRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }
}

#[async_trait]
impl UserStorer for SqliteUserRepository {
    async fn store(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, name, surname, password_hash, session_token, session_expires_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.password_hash)
        .bind(user.session.as_ref().map(|s| s.token.as_str().to_string()))
        .bind(user.session.as_ref().map(|s| s.expires_at))
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserFinder for SqliteUserRepository {
    async fn find_by_id(&self, id: &UserId) -> StoreResult<Option<User>> {
        self.find_one("id", &id.to_string()).await
    }
}

#[async_trait]
impl UserEmailFinder for SqliteUserRepository {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.find_one("email", email).await
    }
}

#[async_trait]
impl UserSessionFinder for SqliteUserRepository {
    async fn find_by_session_token(&self, token: &SessionToken) -> StoreResult<Option<User>> {
        self.find_one("session_token", token.as_str()).await
    }
}

#[async_trait]
impl UserSessionUpdater for SqliteUserRepository {
    async fn update_session(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET session_token = ?, session_expires_at = ? WHERE id = ?",
        )
        .bind(user.session.as_ref().map(|s| s.token.as_str().to_string()))
        .bind(user.session.as_ref().map(|s| s.expires_at))
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(format!("user {}", user.id)));
        }
        Ok(())
    }

    async fn clear_session(&self, id: &UserId, token: &SessionToken) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET session_token = NULL, session_expires_at = NULL
             WHERE id = ? AND session_token = ?",
        )
        .bind(id.to_string())
        .bind(token.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl UserBatchFinder for SqliteUserRepository {
    async fn find_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE id IN ("));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(") ORDER BY created_at");

        let rows = query
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(UserRow::into_user).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::Duration;

    async fn setup_repo() -> (Database, SqliteUserRepository) {
        let db = Database::open_in_memory().await.unwrap();
        let repo = db.users();
        (db, repo)
    }

    fn sample_user(email: &str) -> User {
        User {
            id: UserId::new(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$hash".to_string(),
            session: Some(Session {
                token: SessionToken::new(format!("token-{email}")),
                expires_at: Utc::now() + Duration::hours(24),
            }),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_store_and_find_user() {
        let (_db, repo) = setup_repo().await;
        let user = sample_user("ada@example.com");
        repo.store(&user).await.unwrap();

        let by_id = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");
        assert_eq!(by_id.surname, "Lovelace");
        assert_eq!(by_id.session_token(), user.session_token());

        let by_email = repo.find_by_email("ada@example.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, user.id);

        assert!(repo.find_by_email("ADA@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let (_db, repo) = setup_repo().await;
        repo.store(&sample_user("dup@example.com")).await.unwrap();

        let mut second = sample_user("dup@example.com");
        second.session = None;
        let err = repo.store(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_session_overwrites_and_clears() {
        let (_db, repo) = setup_repo().await;
        let mut user = sample_user("s@example.com");
        repo.store(&user).await.unwrap();
        let old_token = user.session_token().cloned().unwrap();

        user.session = Some(Session {
            token: SessionToken::new("fresh"),
            expires_at: Utc::now() + Duration::hours(1),
        });
        repo.update_session(&user).await.unwrap();
        assert!(repo.find_by_session_token(&old_token).await.unwrap().is_none());
        assert!(repo
            .find_by_session_token(&SessionToken::new("fresh"))
            .await
            .unwrap()
            .is_some());

        user.session = None;
        repo.update_session(&user).await.unwrap();
        let stored = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.session.is_none());
    }

    #[tokio::test]
    async fn test_clear_session_keeps_newer_session() {
        let (_db, repo) = setup_repo().await;
        let mut user = sample_user("s@example.com");
        repo.store(&user).await.unwrap();
        let old_token = user.session_token().cloned().unwrap();

        user.session = Some(Session {
            token: SessionToken::new("fresh"),
            expires_at: Utc::now() + Duration::hours(1),
        });
        repo.update_session(&user).await.unwrap();

        assert!(!repo.clear_session(&user.id, &old_token).await.unwrap());
        let stored = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.session_token(), Some(&SessionToken::new("fresh")));

        assert!(repo
            .clear_session(&user.id, &SessionToken::new("fresh"))
            .await
            .unwrap());
        let stored = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.session.is_none());
    }

    #[tokio::test]
    async fn test_update_session_unknown_user() {
        let (_db, repo) = setup_repo().await;
        let err = repo
            .update_session(&sample_user("ghost@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }

    #[tokio::test]
    async fn test_find_by_ids() {
        let (_db, repo) = setup_repo().await;
        let a = sample_user("a@example.com");
        let b = sample_user("b@example.com");
        repo.store(&a).await.unwrap();
        repo.store(&b).await.unwrap();

        let found = repo.find_by_ids(&[a.id, b.id, UserId::new()]).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
    }
}
