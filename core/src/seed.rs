//! Built-in demo data used when durable storage holds nothing usable.

use serde_json::Map;

use crate::types::{Course, Teacher};

const THUMB_BASE: &str = "https://images.example.com/courses";

#[allow(clippy::too_many_arguments)]
fn course(
    id: &str,
    title: &str,
    author: &str,
    price: f64,
    category: &str,
    teacher: &str,
    published: bool,
    rating: f64,
    reviews: u32,
    lessons: u32,
    best_seller: bool,
) -> Course {
    Course {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        price,
        thumbnail: format!("{THUMB_BASE}/{id}.jpg"),
        published,
        category_id: Some(category.to_string()),
        teacher_id: Some(teacher.to_string()),
        rating: rating.into(),
        reviews: reviews.into(),
        lessons: lessons.into(),
        best_seller: best_seller.into(),
        teacher: None,
        extra: Map::new(),
    }
}

/// Seed courses, newest first. Five are published, one is a draft.
pub fn courses() -> Vec<Course> {
    vec![
        course("c6", "Pricing Strategy Workshop", "Marta Ruiz", 0.0, "business", "t3", false, 0.0, 0, 4, false),
        course("c5", "Negotiation Essentials", "Marta Ruiz", 24.99, "business", "t3", true, 4.4, 310, 12, false),
        course("c4", "Design Systems in Practice", "Lena Ortiz", 34.99, "design", "t2", true, 4.6, 892, 22, false),
        course("c3", "UI Typography Basics", "Lena Ortiz", 19.99, "design", "t2", true, 4.5, 1204, 15, false),
        course("c2", "Async Rust from Scratch", "Sam Kowalski", 49.99, "dev", "t1", true, 4.8, 2310, 36, true),
        course("c1", "Intro to Systems Programming", "Sam Kowalski", 29.99, "dev", "t1", true, 4.7, 5120, 28, true),
    ]
}

/// Instructors referenced by `Course::teacher_id`.
pub fn teachers() -> Vec<Teacher> {
    vec![
        Teacher {
            id: "t1".to_string(),
            name: "Sam Kowalski".to_string(),
            avatar: Some(format!("{THUMB_BASE}/teachers/t1.jpg")),
            bio: Some("Systems engineer, ten years of compilers and runtimes.".to_string()),
        },
        Teacher {
            id: "t2".to_string(),
            name: "Lena Ortiz".to_string(),
            avatar: Some(format!("{THUMB_BASE}/teachers/t2.jpg")),
            bio: Some("Product designer focused on type and layout.".to_string()),
        },
        Teacher {
            id: "t3".to_string(),
            name: "Marta Ruiz".to_string(),
            avatar: None,
            bio: None,
        },
    ]
}
