//! Backend strategy: one trait, a remote and a local implementation.
//!
//! # Design
//! `DataSource` is object-safe (manual `BoxFuture`, no `async_trait`) so
//! `RecordService` can hold whichever backend configuration selected behind
//! one `Arc<dyn DataSource>`. Both implementations return identical shapes;
//! neither ever calls into the other.

use crate::client::CourseClient;
use crate::error::ApiError;
use crate::http::BoxFuture;
use crate::query::CourseQuery;
use crate::request::RequestClient;
use crate::store::LocalStore;
use crate::types::{Course, CoursePatch, DeleteAck, ListResult, NewCourse};

/// Uniform CRUD + list contract.
pub trait DataSource: Send + Sync {
    fn list<'a>(&'a self, query: &'a CourseQuery) -> BoxFuture<'a, Result<ListResult, ApiError>>;

    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Course, ApiError>>;

    fn create(&self, input: NewCourse) -> BoxFuture<'_, Result<Course, ApiError>>;

    fn update<'a>(&'a self, id: &'a str, patch: CoursePatch) -> BoxFuture<'a, Result<Course, ApiError>>;

    fn remove<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<DeleteAck, ApiError>>;

    fn set_published<'a>(&'a self, id: &'a str, published: bool) -> BoxFuture<'a, Result<Course, ApiError>>;
}

/// Serves every call from the HTTP API.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: CourseClient,
    requests: RequestClient,
}

impl RemoteSource {
    pub fn new(client: CourseClient, requests: RequestClient) -> Self {
        Self { client, requests }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}

impl DataSource for RemoteSource {
    fn list<'a>(&'a self, query: &'a CourseQuery) -> BoxFuture<'a, Result<ListResult, ApiError>> {
        Box::pin(async move {
            let body = self.requests.send_default(self.client.build_list_courses(query)).await?;
            self.client.parse_list_courses(query, body)
        })
    }

    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Course, ApiError>> {
        Box::pin(async move {
            let body = self.requests.send_default(self.client.build_get_course(id)).await?;
            self.client.parse_course(body)
        })
    }

    fn create(&self, input: NewCourse) -> BoxFuture<'_, Result<Course, ApiError>> {
        Box::pin(async move {
            let request = self.client.build_create_course(&input)?;
            let body = self.requests.send_default(request).await?;
            self.client.parse_course(body)
        })
    }

    fn update<'a>(&'a self, id: &'a str, patch: CoursePatch) -> BoxFuture<'a, Result<Course, ApiError>> {
        Box::pin(async move {
            let request = self.client.build_update_course(id, &patch)?;
            let body = self.requests.send_default(request).await?;
            self.client.parse_course(body)
        })
    }

    fn remove<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<DeleteAck, ApiError>> {
        Box::pin(async move {
            let body = self.requests.send_default(self.client.build_delete_course(id)).await?;
            self.client.parse_delete_course(id, body)
        })
    }

    fn set_published<'a>(&'a self, id: &'a str, published: bool) -> BoxFuture<'a, Result<Course, ApiError>> {
        Box::pin(async move {
            let request = self.client.build_set_published(id, published)?;
            let body = self.requests.send_default(request).await?;
            self.client.parse_course(body)
        })
    }
}

impl DataSource for LocalStore {
    fn list<'a>(&'a self, query: &'a CourseQuery) -> BoxFuture<'a, Result<ListResult, ApiError>> {
        Box::pin(async move { Ok(LocalStore::list(self, query).await) })
    }

    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Course, ApiError>> {
        Box::pin(LocalStore::get(self, id))
    }

    fn create(&self, input: NewCourse) -> BoxFuture<'_, Result<Course, ApiError>> {
        Box::pin(async move { Ok(LocalStore::create(self, input).await) })
    }

    fn update<'a>(&'a self, id: &'a str, patch: CoursePatch) -> BoxFuture<'a, Result<Course, ApiError>> {
        Box::pin(LocalStore::update(self, id, patch))
    }

    fn remove<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<DeleteAck, ApiError>> {
        Box::pin(LocalStore::delete(self, id))
    }

    fn set_published<'a>(&'a self, id: &'a str, published: bool) -> BoxFuture<'a, Result<Course, ApiError>> {
        Box::pin(LocalStore::set_published(self, id, published))
    }
}
