//! In-process course collection mirrored to durable storage.
//!
//! # Design
//! `LocalStore` answers every operation the remote API offers, with the
//! same shapes, so `RecordService` callers cannot tell which backend served
//! them. The collection is hydrated on first use and guarded by one async
//! mutex; each mutation updates memory, then re-persists the whole document
//! while still holding the lock. A persistence failure is logged and
//! reported to the storage observer, never to the caller.
//!
//! Misses are governed by [`MissPolicy`].

use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{MissPolicy, StoreOptions};
use crate::error::ApiError;
use crate::query::CourseQuery;
use crate::seed;
use crate::storage::{StorageAdapter, StorageKey};
use crate::types::{Course, CoursePatch, DeleteAck, ListResult, NewCourse, Teacher};

/// The synthetic backend.
#[derive(Debug)]
pub struct LocalStore {
    storage: StorageAdapter,
    options: StoreOptions,
    teachers: Vec<Teacher>,
    courses: Mutex<Option<Vec<Course>>>,
}

impl LocalStore {
    pub fn new(storage: StorageAdapter, options: StoreOptions) -> Self {
        Self {
            storage,
            options,
            teachers: seed::teachers(),
            courses: Mutex::new(None),
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn storage(&self) -> &StorageAdapter {
        &self.storage
    }

    /// Hydrate from storage once. Later calls are no-ops.
    pub async fn ensure_loaded(&self) {
        let mut guard = self.courses.lock().await;
        self.hydrate(&mut guard);
    }

    fn hydrate<'a>(&self, slot: &'a mut Option<Vec<Course>>) -> &'a mut Vec<Course> {
        slot.get_or_insert_with(|| {
            let stored: Option<Vec<Course>> = self.storage.try_read_json(StorageKey::Courses.as_str());
            match stored {
                Some(courses) if !courses.is_empty() || !self.options.reseed_when_empty => {
                    info!(count = courses.len(), "hydrated courses from storage");
                    courses
                }
                _ => {
                    let courses = seed::courses();
                    info!(count = courses.len(), "storage empty or unreadable, reseeding courses");
                    persist(&self.storage, &courses);
                    courses
                }
            }
        })
    }

    pub async fn list(&self, query: &CourseQuery) -> ListResult {
        let mut guard = self.courses.lock().await;
        let courses = self.hydrate(&mut guard);

        let needle = query.text().map(str::to_lowercase);
        let category = query.category_id();
        let only_published = query.only_published.unwrap_or(false);

        let matched: Vec<&Course> = courses
            .iter()
            .filter(|c| match &needle {
                Some(n) => c.title.to_lowercase().contains(n) || c.author.to_lowercase().contains(n),
                None => true,
            })
            .filter(|c| category.map_or(true, |cat| c.category_id.as_deref() == Some(cat)))
            .filter(|c| !only_published || c.published)
            .collect();

        let total = matched.len();
        let items: Vec<Course> = matched
            .into_iter()
            .skip(query.offset)
            .take(query.effective_limit())
            .cloned()
            .collect();
        ListResult::new(items, query.offset, total)
    }

    pub async fn get(&self, id: &str) -> Result<Course, ApiError> {
        let mut guard = self.courses.lock().await;
        let courses = self.hydrate(&mut guard);

        let found = match courses.iter().find(|c| c.id == id) {
            Some(course) => course,
            None if self.options.miss_policy == MissPolicy::Lenient => {
                let first = courses.first().ok_or(ApiError::NotFound)?;
                debug!(id, fallback = %first.id, "course not found, falling back to first record");
                first
            }
            None => return Err(ApiError::NotFound),
        };

        let mut course = found.clone();
        course.teacher = course
            .teacher_id
            .as_deref()
            .and_then(|tid| self.teachers.iter().find(|t| t.id == tid))
            .cloned();
        Ok(course)
    }

    pub async fn create(&self, input: NewCourse) -> Course {
        let mut guard = self.courses.lock().await;
        let courses = self.hydrate(&mut guard);

        let course = input.into_course(Uuid::new_v4().to_string());
        courses.insert(0, course.clone());
        persist(&self.storage, courses);
        debug!(id = %course.id, "course created");
        course
    }

    pub async fn update(&self, id: &str, patch: CoursePatch) -> Result<Course, ApiError> {
        let mut guard = self.courses.lock().await;
        let courses = self.hydrate(&mut guard);

        let updated = match courses.iter_mut().find(|c| c.id == id) {
            Some(course) => {
                patch.apply(course);
                course.clone()
            }
            None if self.options.miss_policy == MissPolicy::Lenient => {
                let course = patch.into_course(id.to_string());
                courses.insert(0, course.clone());
                debug!(id, "update on missing id inserted a new course");
                course
            }
            None => return Err(ApiError::NotFound),
        };
        persist(&self.storage, courses);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteAck, ApiError> {
        let mut guard = self.courses.lock().await;
        let courses = self.hydrate(&mut guard);

        match courses.iter().position(|c| c.id == id) {
            Some(index) => {
                courses.remove(index);
                persist(&self.storage, courses);
            }
            None if self.options.miss_policy == MissPolicy::Lenient => {
                debug!(id, "delete on missing id acknowledged");
            }
            None => return Err(ApiError::NotFound),
        }
        Ok(DeleteAck {
            ok: true,
            id: id.to_string(),
        })
    }

    pub async fn set_published(&self, id: &str, published: bool) -> Result<Course, ApiError> {
        let mut guard = self.courses.lock().await;
        let courses = self.hydrate(&mut guard);

        let course = courses.iter_mut().find(|c| c.id == id).ok_or(ApiError::NotFound)?;
        course.published = published;
        let updated = course.clone();
        persist(&self.storage, courses);
        Ok(updated)
    }

    /// Snapshot of the whole collection, newest first.
    pub async fn snapshot(&self) -> Vec<Course> {
        let mut guard = self.courses.lock().await;
        self.hydrate(&mut guard).clone()
    }
}

/// Failures are already logged and observed by the adapter.
fn persist(storage: &StorageAdapter, courses: &[Course]) {
    if storage.save_document(StorageKey::Courses, courses).is_written() {
        debug!(count = courses.len(), "courses persisted");
    }
}
