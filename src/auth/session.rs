//! Session lifecycle for eduboard users.
//!
//! A user is either logged out (no session) or logged in (a session whose
//! expiry is in the future). Each login overwrites the previous session,
//! so a user holds at most one valid token at a time.
//!
//! Store errors are wrapped with the failing operation and returned as-is;
//! nothing here retries.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::db::{NewUser, Session, SessionToken, StoreError, User, UserDirectory, UserId};
use crate::error::StoreResultExt;
use crate::{EduboardError, Result};

use super::password::Authenticator;
use super::validation::validate_registration;

/// Default session lifetime (24 hours).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Orchestrates register, login, logout and session checks.
#[derive(Clone)]
pub struct UserSessionService {
    users: Arc<dyn UserDirectory>,
    authenticator: Authenticator,
    ttl: Duration,
}

impl UserSessionService {
    /// Create a service with the default session lifetime.
    pub fn new(users: Arc<dyn UserDirectory>, authenticator: Authenticator) -> Self {
        Self {
            users,
            authenticator,
            ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        }
    }

    /// Set the session lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn issue_session(&self, now: DateTime<Utc>) -> Session {
        Session {
            token: self.authenticator.new_session_token(),
            expires_at: now + self.ttl,
        }
    }

    /// Register a new user and log them in.
    ///
    /// Fails with `DuplicateEmail` if the email is already taken, checked
    /// first, then with `Validation` for a malformed email or a password
    /// shorter than eight characters.
    pub async fn register(&self, new_user: NewUser, password: &str) -> Result<User> {
        if self
            .users
            .find_by_email(&new_user.email)
            .await
            .context("finding user by email")?
            .is_some()
        {
            return Err(EduboardError::DuplicateEmail);
        }

        validate_registration(&new_user.email, password, &new_user.name, &new_user.surname)?;

        let password_hash = self.authenticator.hash(password)?;
        let now = Utc::now();

        let user = User {
            id: UserId::new(),
            name: new_user.name,
            surname: new_user.surname,
            email: new_user.email,
            password_hash,
            session: Some(self.issue_session(now)),
            created_at: now,
        };

        // The unique email index closes the race between the lookup above
        // and this insert.
        match self.users.store(&user).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(EduboardError::DuplicateEmail),
            Err(e) => return Err(EduboardError::storage("storing user", e)),
        }

        info!(user_id = %user.id, "New user registered");
        Ok(user)
    }

    /// Log a user in, replacing any session they already hold.
    ///
    /// Fails with `NotFound` for an unknown email and `InvalidCredentials`
    /// for a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let mut user = self
            .users
            .find_by_email(email)
            .await
            .context("finding user by email")?
            .ok_or_else(|| EduboardError::NotFound("user".to_string()))?;

        if !self.authenticator.verify(&user.password_hash, password)? {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(EduboardError::InvalidCredentials);
        }

        user.session = Some(self.issue_session(Utc::now()));
        self.users
            .update_session(&user)
            .await
            .context("updating user session")?;

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Log out the holder of `token`.
    ///
    /// An empty token is already logged out and succeeds without touching
    /// the store. An unknown token fails with `NotFound`, as does a token
    /// replaced by a newer login before the clear lands.
    pub async fn logout(&self, token: &SessionToken) -> Result<()> {
        if token.is_empty() {
            debug!("Logout without a session token");
            return Ok(());
        }

        let user = self
            .users
            .find_by_session_token(token)
            .await
            .context("finding user by session token")?
            .ok_or_else(|| EduboardError::NotFound("session".to_string()))?;

        // A login that landed after the lookup owns the session now.
        let cleared = self
            .users
            .clear_session(&user.id, token)
            .await
            .context("clearing user session")?;
        if !cleared {
            debug!(user_id = %user.id, "Session replaced before logout");
            return Err(EduboardError::NotFound("session".to_string()));
        }

        info!(user_id = %user.id, "User logged out");
        Ok(())
    }

    /// Resolve a session token to its user's identity.
    ///
    /// Read-only. Fails with `NotFound` if nobody holds the token and with
    /// `SessionExpired` once the expiry is not in the future.
    pub async fn check_authentication(&self, token: &SessionToken) -> Result<UserId> {
        self.check_authentication_at(token, Utc::now()).await
    }

    /// [`check_authentication`](Self::check_authentication) against an explicit clock.
    pub async fn check_authentication_at(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<UserId> {
        if token.is_empty() {
            return Err(EduboardError::NotFound("session".to_string()));
        }

        let user = self
            .users
            .find_by_session_token(token)
            .await
            .context("finding user by session token")?
            .ok_or_else(|| EduboardError::NotFound("session".to_string()))?;

        if !user.is_logged_in_at(now) {
            return Err(EduboardError::SessionExpired);
        }

        Ok(user.id)
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &UserId) -> Result<User> {
        self.users
            .find_by_id(id)
            .await
            .context("finding user by id")?
            .ok_or_else(|| EduboardError::NotFound("user".to_string()))
    }
}
