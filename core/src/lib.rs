//! Data-access layer for course collections.
//!
//! # Overview
//! `RecordService` serves paginated, filterable, mutable course listings to
//! a UI from either a remote HTTP API or a local synthetic store persisted
//! to key/value storage. Callers see the same shapes from both.
//!
//! # Design
//! - `CourseClient` builds `HttpRequest` values and parses bodies without
//!   touching the network; `RequestClient` executes them through an
//!   `HttpTransport` with per-attempt timeouts and linear backoff.
//! - `LocalStore` is an explicit object, hydrated lazily from a
//!   `StorageAdapter`, never a process-wide singleton.
//! - The backend is a `DataSource` strategy chosen once from
//!   `ServiceConfig`; there is no fallback between backends.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod request;
pub mod seed;
pub mod service;
pub mod source;
pub mod storage;
pub mod store;
pub mod types;

pub use client::CourseClient;
pub use config::{MissPolicy, ServiceConfig, StoreOptions};
pub use error::{ApiError, ConfigError, ErrorInfo, StorageError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use query::CourseQuery;
pub use request::{RequestClient, ResponseBody, SendOptions};
pub use service::{BackendMode, RecordService};
pub use source::{DataSource, RemoteSource};
pub use storage::{FileBackend, KeyValueBackend, MemoryBackend, StorageAdapter, StorageKey, WriteOutcome};
pub use store::LocalStore;
pub use types::{Course, CoursePatch, DeleteAck, ListResult, NewCourse, Teacher};
