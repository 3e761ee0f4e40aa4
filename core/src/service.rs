//! Backend-agnostic facade for course data.
//!
//! `RecordService` owns exactly one [`DataSource`], picked when the service
//! is built. A failure from the remote backend is returned to the caller
//! unchanged; the service never retries against the local store.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::client::CourseClient;
use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::http::{HttpTransport, ReqwestTransport};
use crate::query::CourseQuery;
use crate::request::RequestClient;
use crate::source::{DataSource, RemoteSource};
use crate::storage::{FileBackend, StorageAdapter};
use crate::store::LocalStore;
use crate::types::{Course, CoursePatch, DeleteAck, ListResult, NewCourse};

/// Which backend a service is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Remote,
    Local,
}

#[derive(Clone)]
pub struct RecordService {
    source: Arc<dyn DataSource>,
    mode: BackendMode,
}

impl std::fmt::Debug for RecordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordService").field("mode", &self.mode).finish_non_exhaustive()
    }
}

impl RecordService {
    /// Remote mode when `base_url` is set, otherwise a file-backed local
    /// store under `storage_dir`.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied
    /// transport for the remote path.
    pub fn with_transport(config: &ServiceConfig, transport: Arc<dyn HttpTransport>) -> Self {
        match config.remote_url() {
            Some(url) => {
                info!(base_url = url, "course service using remote backend");
                let requests = RequestClient::new(transport, config.send_options());
                Self::remote(RemoteSource::new(CourseClient::new(url), requests))
            }
            None => {
                info!(dir = %config.storage_dir.display(), "course service using local store");
                let storage = file_storage(&config.storage_dir, &config.storage_scope);
                Self::local(LocalStore::new(storage, config.store_options()))
            }
        }
    }

    pub fn remote(source: RemoteSource) -> Self {
        Self {
            source: Arc::new(source),
            mode: BackendMode::Remote,
        }
    }

    pub fn local(store: LocalStore) -> Self {
        Self {
            source: Arc::new(store),
            mode: BackendMode::Local,
        }
    }

    /// Build a new service for a changed configuration. In-flight calls on
    /// `self` finish against the old backend.
    pub fn reconfigure(&self, config: &ServiceConfig) -> Self {
        Self::from_config(config)
    }

    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    pub async fn list(&self, query: &CourseQuery) -> Result<ListResult, ApiError> {
        self.source.list(query).await
    }

    pub async fn get(&self, id: &str) -> Result<Course, ApiError> {
        self.source.get(id).await
    }

    pub async fn create(&self, input: NewCourse) -> Result<Course, ApiError> {
        self.source.create(input).await
    }

    pub async fn update(&self, id: &str, patch: CoursePatch) -> Result<Course, ApiError> {
        self.source.update(id, patch).await
    }

    pub async fn remove(&self, id: &str) -> Result<DeleteAck, ApiError> {
        self.source.remove(id).await
    }

    pub async fn set_published(&self, id: &str, published: bool) -> Result<Course, ApiError> {
        self.source.set_published(id, published).await
    }
}

fn file_storage(dir: &Path, scope: &str) -> StorageAdapter {
    StorageAdapter::new(Arc::new(FileBackend::new(dir)), scope)
}
