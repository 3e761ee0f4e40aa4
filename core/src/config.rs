//! Service configuration.
//!
//! Sources are layered: struct defaults, then an optional config file
//! (any format the `config` crate recognises by extension), then
//! `COURSES_*` environment variables. An empty or missing `base_url`
//! selects the local store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::request::SendOptions;

pub const ENV_PREFIX: &str = "COURSES";

/// How the local store treats operations on an id it does not hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissPolicy {
    /// Every operation on a missing id fails with `NotFound`.
    #[default]
    Strict,
    /// Demo behaviour: `get` falls back to the first record, `update`
    /// inserts, `delete` acknowledges. `set_published` still fails.
    Lenient,
}

/// Options for `LocalStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub miss_policy: MissPolicy,
    /// Treat a persisted empty list as uninitialised and reseed.
    pub reseed_when_empty: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            miss_policy: MissPolicy::Strict,
            reseed_when_empty: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Remote API root. `None`/empty means offline mode.
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub storage_dir: PathBuf,
    pub storage_scope: String,
    pub miss_policy: MissPolicy,
    pub reseed_when_empty: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 10_000,
            max_retries: 2,
            base_delay_ms: 300,
            storage_dir: PathBuf::from(".course-data"),
            storage_scope: "courses-app".to_string(),
            miss_policy: MissPolicy::Strict,
            reseed_when_empty: true,
        }
    }
}

impl ServiceConfig {
    /// Load from defaults, an optional file and the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(file, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load with an explicit environment source.
    pub fn load_with(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        let config = builder.add_source(env.try_parsing(true)).build()?;
        let loaded: ServiceConfig = config.try_deserialize()?;
        loaded.validate()
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.storage_scope.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "storage_scope",
                reason: "must not be empty".to_string(),
            });
        }
        self.base_url = self
            .base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        Ok(self)
    }

    /// Configured remote root, if remote mode is selected.
    pub fn remote_url(&self) -> Option<&str> {
        self.base_url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }

    pub fn send_options(&self) -> SendOptions {
        SendOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            miss_policy: self.miss_policy,
            reseed_when_empty: self.reseed_when_empty,
        }
    }
}
