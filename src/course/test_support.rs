//! Store double shared by the course service tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::db::{
    CourseEntryDeleter, CourseEntryInserter, CourseEntryManyFinder, CourseEntryOneFinder,
    CourseEntryUpdater, CourseFilter, CourseId, CourseInserter, CourseManyFinder,
    CourseOneFinder, CourseUpdate, CourseUpdater, EntryFilter, EntryId, MemoryStore, StoreError,
    StoreResult, User, UserId,
};

use super::{Course, CourseEntry, CourseEntryUpdate};

/// Memory store that counts calls and can be told to fail.
#[derive(Default)]
pub(crate) struct CountingStore {
    pub inner: MemoryStore,
    pub entry_queries: AtomicUsize,
    pub entry_inserts: AtomicUsize,
    pub entry_deletes: AtomicUsize,
    pub pushes: AtomicUsize,
    pub pulls: AtomicUsize,
    pub fail_course_reads: AtomicBool,
    pub fail_push: AtomicBool,
    pub fail_pull: AtomicBool,
}

fn injected() -> StoreError {
    StoreError::Database("injected failure".to_string())
}

#[async_trait]
impl CourseInserter for CountingStore {
    async fn insert(&self, course: &Course) -> StoreResult<()> {
        CourseInserter::insert(&self.inner, course).await
    }
}

#[async_trait]
impl CourseOneFinder for CountingStore {
    async fn find_one_by_id(&self, id: &CourseId) -> StoreResult<Option<Course>> {
        if self.fail_course_reads.load(Ordering::SeqCst) {
            return Err(injected());
        }
        CourseOneFinder::find_one_by_id(&self.inner, id).await
    }
}

#[async_trait]
impl CourseManyFinder for CountingStore {
    async fn find_many(&self, filter: &CourseFilter) -> StoreResult<Vec<Course>> {
        if self.fail_course_reads.load(Ordering::SeqCst) {
            return Err(injected());
        }
        CourseManyFinder::find_many(&self.inner, filter).await
    }
}

#[async_trait]
impl CourseUpdater for CountingStore {
    async fn update(&self, id: &CourseId, update: &CourseUpdate) -> StoreResult<Option<Course>> {
        match update {
            CourseUpdate::PushEntry(_) => {
                self.pushes.fetch_add(1, Ordering::SeqCst);
                if self.fail_push.load(Ordering::SeqCst) {
                    return Err(injected());
                }
            }
            CourseUpdate::PullEntry(_) => {
                self.pulls.fetch_add(1, Ordering::SeqCst);
                if self.fail_pull.load(Ordering::SeqCst) {
                    return Err(injected());
                }
            }
            _ => {}
        }
        CourseUpdater::update(&self.inner, id, update).await
    }
}

#[async_trait]
impl CourseEntryInserter for CountingStore {
    async fn insert(&self, entry: &CourseEntry) -> StoreResult<()> {
        self.entry_inserts.fetch_add(1, Ordering::SeqCst);
        CourseEntryInserter::insert(&self.inner, entry).await
    }
}

#[async_trait]
impl CourseEntryOneFinder for CountingStore {
    async fn find_one_by_id(&self, id: &EntryId) -> StoreResult<Option<CourseEntry>> {
        CourseEntryOneFinder::find_one_by_id(&self.inner, id).await
    }
}

#[async_trait]
impl CourseEntryManyFinder for CountingStore {
    async fn find_many(&self, filter: &EntryFilter) -> StoreResult<Vec<CourseEntry>> {
        self.entry_queries.fetch_add(1, Ordering::SeqCst);
        CourseEntryManyFinder::find_many(&self.inner, filter).await
    }
}

#[async_trait]
impl CourseEntryUpdater for CountingStore {
    async fn update(
        &self,
        id: &EntryId,
        update: &CourseEntryUpdate,
    ) -> StoreResult<Option<CourseEntry>> {
        CourseEntryUpdater::update(&self.inner, id, update).await
    }
}

#[async_trait]
impl CourseEntryDeleter for CountingStore {
    async fn delete(&self, id: &EntryId) -> StoreResult<bool> {
        self.entry_deletes.fetch_add(1, Ordering::SeqCst);
        CourseEntryDeleter::delete(&self.inner, id).await
    }
}

pub(crate) fn sample_user(email: &str) -> User {
    User {
        id: UserId::new(),
        name: "Test".to_string(),
        surname: "User".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$unused".to_string(),
        session: None,
        created_at: Utc::now(),
    }
}

pub(crate) fn sample_entry(course_id: CourseId, message: &str) -> CourseEntry {
    let now = Utc::now();
    CourseEntry {
        id: EntryId::new(),
        course_id,
        message: message.to_string(),
        pictures: vec![],
        date: now,
        created_at: now,
        published: true,
    }
}

/// Seed a course with `count` indexed entries directly in the inner store.
pub(crate) async fn course_with_entries(store: &CountingStore, count: usize) -> Course {
    let mut course = Course {
        id: CourseId::new(),
        title: "Seeded".to_string(),
        description: String::new(),
        labels: vec![],
        members: vec![],
        entry_ids: vec![],
        created_at: Utc::now(),
    };

    for i in 0..count {
        let entry = sample_entry(course.id, &format!("entry {i}"));
        CourseEntryInserter::insert(&store.inner, &entry).await.unwrap();
        course.entry_ids.push(entry.id);
    }
    CourseInserter::insert(&store.inner, &course).await.unwrap();
    course
}
