//! Concurrent entry writes against both store backends.
//!
//! Many entries created and deleted at once must all land in (or leave) the
//! course index exactly once.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tempfile::TempDir;

use eduboard::course::{CourseEntryService, CourseService, NewCourse, NewCourseEntry, Reconciler};
use eduboard::db::{CourseEntryRepository, CourseRepository, EntryId};
use eduboard::file::DiskUploader;
use eduboard::MemoryStore;

const WRITERS: usize = 24;

struct Services {
    courses: CourseService,
    entries: CourseEntryService,
    reconciler: Reconciler,
    _upload_dir: TempDir,
}

fn services<C, E>(courses: Arc<C>, entries: Arc<E>) -> Services
where
    C: CourseRepository + 'static,
    E: CourseEntryRepository + 'static,
{
    let upload_dir = TempDir::new().unwrap();
    let uploader = Arc::new(DiskUploader::new(upload_dir.path(), "/files").unwrap());

    Services {
        courses: CourseService::new(courses.clone(), entries.clone()),
        entries: CourseEntryService::new(courses.clone(), entries.clone(), uploader),
        reconciler: Reconciler::new(courses, entries),
        _upload_dir: upload_dir,
    }
}

async fn create_and_delete_concurrently(services: Services) {
    let course = services
        .courses
        .create_course(NewCourse::new("Concurrent"))
        .await
        .unwrap();

    let created = join_all((0..WRITERS).map(|i| {
        let entries = &services.entries;
        let course_id = course.id;
        async move {
            entries
                .create_entry(NewCourseEntry::new(format!("entry {i}")), &course_id)
                .await
        }
    }))
    .await;

    let ids: Vec<EntryId> = created.into_iter().map(|r| r.unwrap().id).collect();
    let aggregated = services.courses.get_course(&course.id).await.unwrap();

    let indexed: HashSet<EntryId> = aggregated.course.entry_ids.iter().copied().collect();
    assert_eq!(aggregated.course.entry_ids.len(), WRITERS, "no duplicates");
    assert_eq!(indexed, ids.iter().copied().collect::<HashSet<_>>());
    assert_eq!(aggregated.entries.len(), WRITERS);

    // Delete every other entry concurrently
    let doomed: Vec<EntryId> = ids.iter().copied().step_by(2).collect();
    let deleted = join_all(doomed.iter().map(|id| {
        let entries = &services.entries;
        let course_id = course.id;
        async move { entries.delete_entry(id, &course_id).await }
    }))
    .await;
    assert!(deleted.iter().all(|r| r.is_ok()));

    let aggregated = services.courses.get_course(&course.id).await.unwrap();
    assert_eq!(aggregated.course.entry_ids.len(), WRITERS - doomed.len());
    assert!(doomed
        .iter()
        .all(|id| !aggregated.course.entry_ids.contains(id)));

    let report = services.reconciler.reconcile(&course.id).await.unwrap();
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_concurrent_entry_writes_memory_store() {
    let store = Arc::new(MemoryStore::new());
    create_and_delete_concurrently(services(store.clone(), store)).await;
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_concurrent_entry_writes_sqlite() {
    let db = eduboard::Database::open_in_memory().await.unwrap();
    create_and_delete_concurrently(services(Arc::new(db.courses()), Arc::new(db.entries()))).await;
}

#[cfg(feature = "sqlite")]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_entry_writes_sqlite_file() {
    let temp = TempDir::new().unwrap();
    let db = eduboard::Database::open(temp.path().join("eduboard.db"))
        .await
        .unwrap();
    create_and_delete_concurrently(services(Arc::new(db.courses()), Arc::new(db.entries()))).await;
}
