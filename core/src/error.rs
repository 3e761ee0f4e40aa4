//! Error types for the course data layer.
//!
//! # Design
//! `ApiError` classifies every failure a caller of `RecordService` can see,
//! on either backend. The retry policy in `RequestClient` is driven entirely
//! by [`ApiError::is_retryable`], so the classification lives next to the
//! variants. `NotFound` keeps its own variant because callers distinguish
//! "the record does not exist" from "the server misbehaved", and the local
//! store reports misses through the same variant as a remote 404.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by `RecordService` and the components beneath it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Connection refused, DNS failure, reset, or any other transport-level
    /// failure before a status line was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// A single attempt exceeded its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// 5xx or 408. Retryable.
    #[error("server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    /// 4xx other than 404 and 408. Terminal.
    #[error("client error (HTTP {status}): {body}")]
    Client { status: u16, body: String },

    /// The requested course does not exist.
    #[error("resource not found")]
    NotFound,

    /// The response body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Parse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => ApiError::NotFound,
            408 | 500..=599 => ApiError::Server { status, body },
            _ => ApiError::Client { status, body },
        }
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::Timeout(_) | ApiError::Server { .. }
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } | ApiError::Client { status, .. } => Some(*status),
            ApiError::NotFound => Some(404),
            _ => None,
        }
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Timeout(_))
    }

    /// Normalized form handed to presentation code.
    pub fn info(&self) -> ErrorInfo {
        ErrorInfo {
            message: self.to_string(),
            status: self.status(),
            is_network_error: self.is_network_error(),
        }
    }
}

/// `{message, status, isNetworkError}` view of an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub message: String,
    pub status: Option<u16>,
    pub is_network_error: bool,
}

impl From<&ApiError> for ErrorInfo {
    fn from(err: &ApiError) -> Self {
        err.info()
    }
}

/// Failures of the durable key/value layer. These never reach callers of
/// the store; they are logged and handed to the storage observer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage backend lock poisoned")]
    Lock,
}

/// Configuration could not be assembled from its sources.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
