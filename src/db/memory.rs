//! In-memory document store.
//!
//! Holds the three collections (users, courses, course entries) in
//! insertion order behind a lock per collection. Every trait call takes the
//! lock once, so each call is atomic on its document, while a sequence of
//! calls is not.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::course::{Course, CourseEntry, CourseEntryUpdate};

use super::traits::{
    CourseEntryDeleter, CourseEntryInserter, CourseEntryManyFinder, CourseEntryOneFinder,
    CourseEntryUpdater, CourseFilter, CourseInserter, CourseManyFinder, CourseOneFinder,
    CourseUpdate, CourseUpdater, EntryFilter, StoreError, StoreResult, UserBatchFinder,
    UserEmailFinder, UserFinder, UserSessionFinder, UserSessionUpdater, UserStorer,
};
use super::{CourseId, EntryId, SessionToken, User, UserId};

/// Process-local document store implementing every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    courses: RwLock<Vec<Course>>,
    entries: RwLock<Vec<CourseEntry>>,
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Database("memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Database("memory store lock poisoned".to_string()))
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        read(&self.users).map(|u| u.len()).unwrap_or(0)
    }

    /// Number of stored course entries.
    pub fn entry_count(&self) -> usize {
        read(&self.entries).map(|e| e.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserStorer for MemoryStore {
    async fn store(&self, user: &User) -> StoreResult<()> {
        let mut users = write(&self.users)?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users.email".to_string()));
        }
        if users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::Conflict("users.id".to_string()));
        }
        users.push(user.clone());
        Ok(())
    }
}

#[async_trait]
impl UserFinder for MemoryStore {
    async fn find_by_id(&self, id: &UserId) -> StoreResult<Option<User>> {
        Ok(read(&self.users)?.iter().find(|u| u.id == *id).cloned())
    }
}

#[async_trait]
impl UserEmailFinder for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(read(&self.users)?.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl UserSessionFinder for MemoryStore {
    async fn find_by_session_token(&self, token: &SessionToken) -> StoreResult<Option<User>> {
        Ok(read(&self.users)?
            .iter()
            .find(|u| u.session_token() == Some(token))
            .cloned())
    }
}

#[async_trait]
impl UserSessionUpdater for MemoryStore {
    async fn update_session(&self, user: &User) -> StoreResult<()> {
        let mut users = write(&self.users)?;
        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| StoreError::Missing(format!("user {}", user.id)))?;
        stored.session = user.session.clone();
        Ok(())
    }

    async fn clear_session(&self, id: &UserId, token: &SessionToken) -> StoreResult<bool> {
        let mut users = write(&self.users)?;
        match users
            .iter_mut()
            .find(|u| u.id == *id && u.session_token() == Some(token))
        {
            Some(user) => {
                user.session = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserBatchFinder for MemoryStore {
    async fn find_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        Ok(read(&self.users)?
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CourseInserter for MemoryStore {
    async fn insert(&self, course: &Course) -> StoreResult<()> {
        let mut courses = write(&self.courses)?;
        if courses.iter().any(|c| c.id == course.id) {
            return Err(StoreError::Conflict("courses.id".to_string()));
        }
        courses.push(course.clone());
        Ok(())
    }
}

#[async_trait]
impl CourseOneFinder for MemoryStore {
    async fn find_one_by_id(&self, id: &CourseId) -> StoreResult<Option<Course>> {
        Ok(read(&self.courses)?.iter().find(|c| c.id == *id).cloned())
    }
}

#[async_trait]
impl CourseManyFinder for MemoryStore {
    async fn find_many(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>> {
        Ok(read(&self.courses)?
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CourseUpdater for MemoryStore {
    async fn update(&self, id: &CourseId, update: &CourseUpdate) -> StoreResult<Option<Course>> {
        let mut courses = write(&self.courses)?;
        Ok(courses.iter_mut().find(|c| c.id == *id).map(|course| {
            update.apply_to(course);
            course.clone()
        }))
    }
}

#[async_trait]
impl CourseEntryInserter for MemoryStore {
    async fn insert(&self, entry: &CourseEntry) -> StoreResult<()> {
        let mut entries = write(&self.entries)?;
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(StoreError::Conflict("course_entries.id".to_string()));
        }
        entries.push(entry.clone());
        Ok(())
    }
}

#[async_trait]
impl CourseEntryOneFinder for MemoryStore {
    async fn find_one_by_id(&self, id: &EntryId) -> StoreResult<Option<CourseEntry>> {
        Ok(read(&self.entries)?.iter().find(|e| e.id == *id).cloned())
    }
}

#[async_trait]
impl CourseEntryManyFinder for MemoryStore {
    async fn find_many(&self, filter: &EntryFilter) -> StoreResult<Vec<CourseEntry>> {
        Ok(read(&self.entries)?
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CourseEntryUpdater for MemoryStore {
    async fn update(
        &self,
        id: &EntryId,
        update: &CourseEntryUpdate,
    ) -> StoreResult<Option<CourseEntry>> {
        let mut entries = write(&self.entries)?;
        Ok(entries.iter_mut().find(|e| e.id == *id).map(|entry| {
            update.apply_to(entry);
            entry.clone()
        }))
    }
}

#[async_trait]
impl CourseEntryDeleter for MemoryStore {
    async fn delete(&self, id: &EntryId) -> StoreResult<bool> {
        let mut entries = write(&self.entries)?;
        let before = entries.len();
        entries.retain(|e| e.id != *id);
        Ok(entries.len() != before)
    }
}
