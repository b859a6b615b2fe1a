//! User model for eduboard.
//!
//! A user carries at most one live session. The session is a value on the
//! user document, not a separate collection: issuing a new one overwrites
//! the previous token, which is what makes logins single-session.

use std::fmt;

use chrono::{DateTime, Utc};

use super::UserId;

/// Opaque session token, as handed to clients in the session cookie.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Tokens are credentials; keep them out of debug output and logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

impl From<String> for SessionToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// A session issued to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Token identifying the session.
    pub token: SessionToken,
    /// Instant after which the session is no longer accepted.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is still valid at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// User entity.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Login email (unique, case-sensitive as stored).
    pub email: String,
    /// Password hash (Argon2 PHC string).
    pub password_hash: String,
    /// Current session, `None` when logged out.
    pub session: Option<Session>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the user holds a session that is valid at `now`.
    pub fn is_logged_in_at(&self, now: DateTime<Utc>) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_live_at(now))
    }

    /// The current session token, if any.
    pub fn session_token(&self) -> Option<&SessionToken> {
        self.session.as_ref().map(|s| &s.token)
    }
}

/// Profile fields supplied at registration.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
}

impl NewUser {
    /// Create a new user profile with the given email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// Set the given name and family name.
    pub fn with_name(mut self, name: impl Into<String>, surname: impl Into<String>) -> Self {
        self.name = name.into();
        self.surname = surname.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user_with_session(expires_at: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            session: Some(Session {
                token: SessionToken::new("token"),
                expires_at,
            }),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_live_before_expiry() {
        let now = Utc::now();
        let user = user_with_session(now + Duration::hours(1));
        assert!(user.is_logged_in_at(now));
    }

    #[test]
    fn test_session_dead_at_expiry() {
        let now = Utc::now();
        let user = user_with_session(now);
        assert!(!user.is_logged_in_at(now));
    }

    #[test]
    fn test_logged_out_user() {
        let mut user = user_with_session(Utc::now() + Duration::hours(1));
        user.session = None;
        assert!(!user.is_logged_in_at(Utc::now()));
        assert!(user.session_token().is_none());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = SessionToken::new("super-secret");
        assert_eq!(format!("{token:?}"), "SessionToken(..)");
    }

    #[test]
    fn test_new_user_builder() {
        let new_user = NewUser::new("e@mail.com").with_name("Grace", "Hopper");
        assert_eq!(new_user.email, "e@mail.com");
        assert_eq!(new_user.name, "Grace");
        assert_eq!(new_user.surname, "Hopper");
    }
}
