//! Stateless HTTP request builder and response parser for the course API.
//!
//! # Design
//! `CourseClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes the
//! decoded `ResponseBody`. Status classification and retries live in
//! `RequestClient`, so by the time a body reaches `parse_*` the exchange
//! already succeeded.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::query::CourseQuery;
use crate::request::ResponseBody;
use crate::types::{Course, CoursePatch, DeleteAck, ListPage, ListResult, NewCourse, PublishRequest};

/// Synchronous, stateless builder/parser for the course endpoints.
#[derive(Debug, Clone)]
pub struct CourseClient {
    base_url: String,
}

impl CourseClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_courses(&self, query: &CourseQuery) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/courses?{}", self.base_url, query.encode()),
            headers: accept_json(),
            body: None,
        }
    }

    pub fn build_get_course(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.course_path(id),
            headers: accept_json(),
            body: None,
        }
    }

    pub fn build_create_course(&self, input: &NewCourse) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/courses", self.base_url),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_update_course(&self, id: &str, input: &CoursePatch) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.course_path(id),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_delete_course(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.course_path(id),
            headers: accept_json(),
            body: None,
        }
    }

    pub fn build_set_published(&self, id: &str, published: bool) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/publish", self.course_path(id)),
            headers: json_headers(),
            body: Some(to_json(&PublishRequest { published })?),
        })
    }

    /// `hasMore` is recomputed from `query.offset`, never trusted.
    pub fn parse_list_courses(&self, query: &CourseQuery, body: ResponseBody) -> Result<ListResult, ApiError> {
        let page: ListPage = body.into_json()?;
        Ok(ListResult::new(page.items, query.offset, page.total))
    }

    pub fn parse_course(&self, body: ResponseBody) -> Result<Course, ApiError> {
        body.into_json()
    }

    /// A server that answers delete with an empty body is treated as `ok`.
    pub fn parse_delete_course(&self, id: &str, body: ResponseBody) -> Result<DeleteAck, ApiError> {
        match body {
            ResponseBody::Empty => Ok(DeleteAck {
                ok: true,
                id: id.to_string(),
            }),
            other => other.into_json(),
        }
    }

    fn course_path(&self, id: &str) -> String {
        // Form encoding writes spaces as `+`, which is literal in a path.
        let segment: String = url::form_urlencoded::byte_serialize(id.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        format!("{}/courses/{segment}", self.base_url)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn accept_json() -> Vec<(String, String)> {
    vec![("accept".to_string(), "application/json".to_string())]
}

fn json_headers() -> Vec<(String, String)> {
    vec![
        ("accept".to_string(), "application/json".to_string()),
        ("content-type".to_string(), "application/json".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn client() -> CourseClient {
        CourseClient::new("http://localhost:3000")
    }

    #[test]
    fn build_list_courses_includes_query() {
        let query = CourseQuery::page(4, 2).only_published(true);
        let req = client().build_list_courses(&query);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/courses?offset=4&limit=2&onlyPublished=true");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_get_course_escapes_id() {
        let req = client().build_get_course("a/b c");
        assert_eq!(req.path, "http://localhost:3000/courses/a%2Fb%20c");
    }

    #[test]
    fn build_create_course_produces_json_body() {
        let input = NewCourse {
            title: "Rust".to_string(),
            author: "Ferris".to_string(),
            price: 19.5,
            thumbnail: "https://img/rust.png".to_string(),
            ..NewCourse::default()
        };
        let req = client().build_create_course(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/courses");
        assert!(req.headers.contains(&("content-type".to_string(), "application/json".to_string())));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Rust");
        assert_eq!(body["price"], 19.5);
        assert!(body.get("published").is_none());
    }

    #[test]
    fn build_update_course_sends_only_present_fields() {
        let patch = CoursePatch {
            price: Some(5.0),
            ..CoursePatch::default()
        };
        let req = client().build_update_course("c1", &patch).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/courses/c1");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"price": 5.0}));
    }

    #[test]
    fn build_set_published_targets_publish_route() {
        let req = client().build_set_published("c1", true).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/courses/c1/publish");
        assert_eq!(req.body.as_deref(), Some(r#"{"published":true}"#));
    }

    #[test]
    fn parse_list_courses_rederives_has_more() {
        let body = ResponseBody::Json(json!({
            "items": [{"id":"c1","title":"t","author":"a","price":1,"thumbnail":"u"}],
            "total": 3,
            "hasMore": false
        }));
        let result = client().parse_list_courses(&CourseQuery::page(0, 1), body).unwrap();
        assert_eq!(result.items().len(), 1);
        assert_eq!(result.total(), 3);
        assert!(result.has_more());
    }

    #[test]
    fn parse_list_courses_keeps_odd_display_values() {
        let body = ResponseBody::Json(json!({
            "items": [
                {"id":"c1","title":"t","author":"a","price":1,"thumbnail":"u","rating":null,"reviews":"2.3k"},
                {"id":"c2","title":"t","author":"a","price":1,"thumbnail":"u","lessons":12.5,"bestSeller":null}
            ],
            "total": 2
        }));
        let result = client().parse_list_courses(&CourseQuery::page(0, 20), body).unwrap();
        let items = result.items();
        assert!(items[0].rating.is_null());
        assert_eq!(items[0].reviews, "2.3k");
        assert_eq!(items[1].lessons, 12.5);
        assert!(items[1].best_seller.is_null());
    }

    #[test]
    fn parse_course_rejects_text() {
        let err = client().parse_course(ResponseBody::Text("<html>".into())).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn parse_delete_course_accepts_empty_body() {
        let ack = client().parse_delete_course("c9", ResponseBody::Empty).unwrap();
        assert_eq!(ack, DeleteAck { ok: true, id: "c9".into() });
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = CourseClient::new("http://localhost:3000/");
        let req = client.build_get_course("c1");
        assert_eq!(req.path, "http://localhost:3000/courses/c1");
    }
}
