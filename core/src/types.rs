//! Domain DTOs for the course API.
//!
//! # Design
//! The same types travel over HTTP (camelCase JSON) and into durable
//! storage, so both backends hand callers identical shapes. Display-only
//! fields (`rating`, `reviews`, `lessons`, `bestSeller`) are not validated:
//! any JSON value, `null` included, is carried as-is. Unknown JSON fields
//! survive a round-trip through the `extra` map; `id` and `teacher` are
//! never accepted there.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single course record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub thumbnail: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(default = "zero_rating")]
    pub rating: Value,
    #[serde(default = "zero_count")]
    pub reviews: Value,
    #[serde(default = "zero_count")]
    pub lessons: Value,
    #[serde(default = "not_flagged")]
    pub best_seller: Value,
    /// Instructor joined in by `get`; never persisted by the local store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<Teacher>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Instructor embedded into a course by `get`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Request payload for creating a course. Fields left `None` get the
/// store's defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    pub author: String,
    pub price: f64,
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_seller: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewCourse {
    /// Materialize the payload under `id`, applying create defaults.
    pub fn into_course(self, id: String) -> Course {
        Course {
            id,
            title: self.title,
            author: self.author,
            price: self.price,
            thumbnail: self.thumbnail,
            published: self.published.unwrap_or(false),
            category_id: self.category_id,
            teacher_id: self.teacher_id,
            rating: self.rating.unwrap_or_else(zero_rating),
            reviews: self.reviews.unwrap_or_else(zero_count),
            lessons: self.lessons.unwrap_or_else(zero_count),
            best_seller: self.best_seller.unwrap_or_else(not_flagged),
            teacher: None,
            extra: without_reserved(self.extra),
        }
    }
}

/// Request payload for updating a course. Only the fields present in the
/// JSON are applied; omitted fields remain unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_seller: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CoursePatch {
    /// Shallow-merge onto `course`. The id is never touched.
    pub fn apply(self, course: &mut Course) {
        if let Some(title) = self.title {
            course.title = title;
        }
        if let Some(author) = self.author {
            course.author = author;
        }
        if let Some(price) = self.price {
            course.price = price;
        }
        if let Some(thumbnail) = self.thumbnail {
            course.thumbnail = thumbnail;
        }
        if let Some(published) = self.published {
            course.published = published;
        }
        if let Some(category_id) = self.category_id {
            course.category_id = Some(category_id);
        }
        if let Some(teacher_id) = self.teacher_id {
            course.teacher_id = Some(teacher_id);
        }
        if let Some(rating) = self.rating {
            course.rating = rating;
        }
        if let Some(reviews) = self.reviews {
            course.reviews = reviews;
        }
        if let Some(lessons) = self.lessons {
            course.lessons = lessons;
        }
        if let Some(best_seller) = self.best_seller {
            course.best_seller = best_seller;
        }
        course.extra.extend(without_reserved(self.extra));
    }

    /// Build a record from a patch alone, used by upsert-on-miss.
    pub fn into_course(self, id: String) -> Course {
        let mut course = NewCourse::default().into_course(id);
        self.apply(&mut course);
        course
    }
}

/// Keys a payload may not smuggle in through its flattened map: they would
/// serialize next to the typed field of the same name.
const RESERVED_KEYS: [&str; 2] = ["id", "teacher"];

fn without_reserved(mut extra: Map<String, Value>) -> Map<String, Value> {
    extra.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
    extra
}

fn zero_rating() -> Value {
    Value::from(0.0)
}

fn zero_count() -> Value {
    Value::from(0u32)
}

fn not_flagged() -> Value {
    Value::Bool(false)
}

/// One page of a filtered course listing.
///
/// `has_more` is derived in [`ListResult::new`] and cannot be set any other
/// way.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    items: Vec<Course>,
    total: usize,
    has_more: bool,
}

impl ListResult {
    pub fn new(items: Vec<Course>, offset: usize, total: usize) -> Self {
        let has_more = offset.saturating_add(items.len()) < total;
        Self {
            items,
            total,
            has_more,
        }
    }

    pub fn items(&self) -> &[Course] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Course> {
        self.items
    }

    /// Number of records matching the filter, before pagination.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }
}

/// Wire form of a listing as received from a remote backend. The remote
/// `hasMore` is ignored and re-derived.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListPage {
    pub items: Vec<Course>,
    pub total: usize,
}

/// Acknowledgement returned by delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteAck {
    pub ok: bool,
    pub id: String,
}

/// Body of `POST /courses/{id}/publish`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishRequest {
    pub published: bool,
}
