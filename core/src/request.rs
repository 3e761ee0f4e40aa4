//! One logical HTTP call with per-attempt timeout and linear backoff.
//!
//! # Design
//! `RequestClient` is the only place that sleeps or times out. The retry
//! loop is driven by [`ApiError::is_retryable`]: transport failures,
//! timeouts, 5xx and 408 are retried, everything else is returned as soon
//! as it is seen. Backoff is linear, `base_delay * attempt`, which suits a
//! low-QPS UI client.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};

/// Per-call resilience settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    /// Deadline for each individual attempt.
    pub timeout: Duration,
    /// Extra attempts after the first; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    /// Delay unit for linear backoff.
    pub base_delay: Duration,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            base_delay: Duration::from_millis(300),
        }
    }
}

impl SendOptions {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait before the attempt following attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    fn decode(response: HttpResponse) -> Result<Self, ApiError> {
        if response.body.is_empty() {
            return Ok(ResponseBody::Empty);
        }
        if response.is_json() {
            return serde_json::from_str(&response.body)
                .map(ResponseBody::Json)
                .map_err(|e| ApiError::Parse(e.to_string()));
        }
        Ok(ResponseBody::Text(response.body))
    }

    /// Deserialize a JSON body into `T`.
    pub fn into_json<T: serde::de::DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            ResponseBody::Json(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
            }
            ResponseBody::Text(text) => Err(ApiError::Parse(format!("expected JSON, got text: {text}"))),
            ResponseBody::Empty => Err(ApiError::Parse("expected JSON, got empty body".to_string())),
        }
    }
}

/// Executes requests through an [`HttpTransport`] with retries.
#[derive(Clone)]
pub struct RequestClient {
    transport: Arc<dyn HttpTransport>,
    options: SendOptions,
}

impl std::fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestClient").field("options", &self.options).finish_non_exhaustive()
    }
}

impl RequestClient {
    pub fn new(transport: Arc<dyn HttpTransport>, options: SendOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }

    /// Send with this client's default options.
    pub async fn send_default(&self, request: HttpRequest) -> Result<ResponseBody, ApiError> {
        self.send(request, &self.options).await
    }

    /// Send `request`, retrying transient failures, and decode the body.
    ///
    /// The last observed error is returned once the attempt budget is
    /// spent. Non-retryable errors are returned immediately.
    pub async fn send(&self, request: HttpRequest, options: &SendOptions) -> Result<ResponseBody, ApiError> {
        let max_attempts = options.max_attempts();
        let mut attempt = 1;
        loop {
            let result = self.attempt(request.clone(), options, attempt).await;
            let err = match result {
                Ok(response) => return ResponseBody::decode(response),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt >= max_attempts {
                debug!(
                    method = request.method.as_str(),
                    path = %request.path,
                    attempt,
                    error = %err,
                    "request failed"
                );
                return Err(err);
            }

            let delay = options.backoff(attempt);
            warn!(
                method = request.method.as_str(),
                path = %request.path,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(
        &self,
        request: HttpRequest,
        options: &SendOptions,
        attempt: u32,
    ) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, attempt, "sending request");
        let response = tokio::time::timeout(options.timeout, self.transport.execute(request))
            .await
            .map_err(|_| ApiError::Timeout(options.timeout))?
            .map_err(ApiError::Transport)?;

        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_status(response.status, response.body))
        }
    }
}
