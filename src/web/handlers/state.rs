//! Shared application state.

use std::sync::Arc;

use chrono::Duration;

use crate::auth::{Authenticator, UserSessionService};
use crate::course::{CourseEntryService, CourseService, Reconciler};
use crate::db::{CourseEntryRepository, CourseRepository, UserBatchFinder, UserDirectory};
use crate::file::Uploader;

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Cookie name.
    pub name: String,
    /// Whether the cookie is marked `Secure`.
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: "sessionID".to_string(),
            secure: false,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Register, login, logout and session checks.
    pub sessions: UserSessionService,
    /// Batch user lookup for course member listings.
    pub users: Arc<dyn UserBatchFinder>,
    /// Course retrieval and membership.
    pub courses: CourseService,
    /// Entry lifecycle.
    pub entries: CourseEntryService,
    /// Entry-index repair.
    pub reconciler: Reconciler,
    /// Session cookie settings.
    pub cookie: CookieSettings,
}

impl AppState {
    /// Wire every service over the given store collections.
    ///
    /// The same backend may be passed for all three.
    pub fn new<U, C, E>(
        users: Arc<U>,
        courses: Arc<C>,
        entries: Arc<E>,
        uploader: Arc<dyn Uploader>,
        authenticator: Authenticator,
    ) -> Self
    where
        U: UserDirectory + 'static,
        C: CourseRepository + 'static,
        E: CourseEntryRepository + 'static,
    {
        Self {
            sessions: UserSessionService::new(users.clone(), authenticator),
            users,
            courses: CourseService::new(courses.clone(), entries.clone()),
            entries: CourseEntryService::new(courses.clone(), entries.clone(), uploader),
            reconciler: Reconciler::new(courses, entries),
            cookie: CookieSettings::default(),
        }
    }

    /// Set the session lifetime.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = self.sessions.with_ttl(ttl);
        self
    }

    /// Set the session cookie settings.
    pub fn with_cookie(mut self, cookie: CookieSettings) -> Self {
        self.cookie = cookie;
        self
    }
}
