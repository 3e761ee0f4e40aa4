//! Scoped key/value JSON persistence for the local store.
//!
//! # Design
//! `StorageAdapter` is best-effort: reads fall back to a caller-supplied
//! value on any failure and writes report a [`WriteOutcome`] instead of an
//! error. Nothing here can fail a store operation. Failures are logged and
//! forwarded to an optional observer so a host can surface them.
//!
//! Every document is loaded and saved whole; there are no partial updates.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::StorageError;

/// Documents the application keeps in durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Courses,
    Users,
    InviteCodes,
    Schedule,
    LiveSessions,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::Courses,
        StorageKey::Users,
        StorageKey::InviteCodes,
        StorageKey::Schedule,
        StorageKey::LiveSessions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Courses => "courses",
            StorageKey::Users => "users",
            StorageKey::InviteCodes => "invite_codes",
            StorageKey::Schedule => "schedule",
            StorageKey::LiveSessions => "live_sessions",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw string storage. Implementations are synchronous.
pub trait KeyValueBackend: Send + Sync {
    /// `Ok(None)` when the key has never been written.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        // Write-then-rename: readers never see a half-written document.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Lock)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Lock)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Result of a best-effort write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Failed(String),
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written)
    }
}

/// Callback invoked with the physical key and the error of a failed write.
pub type WriteObserver = Arc<dyn Fn(&str, &StorageError) + Send + Sync>;

/// Scoped JSON view over a [`KeyValueBackend`].
#[derive(Clone)]
pub struct StorageAdapter {
    backend: Arc<dyn KeyValueBackend>,
    scope: String,
    observer: Option<WriteObserver>,
}

impl fmt::Debug for StorageAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageAdapter")
            .field("scope", &self.scope)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl StorageAdapter {
    pub fn new(backend: Arc<dyn KeyValueBackend>, scope: impl Into<String>) -> Self {
        Self {
            backend,
            scope: scope.into(),
            observer: None,
        }
    }

    /// Adapter over a fresh [`MemoryBackend`].
    pub fn in_memory(scope: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), scope)
    }

    pub fn with_observer<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &StorageError) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(f));
        self
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}:{}", self.scope, key)
    }

    /// Raw stored string for `key`, if any. Errors read as absent.
    pub fn read_raw(&self, key: &str) -> Option<String> {
        let key = self.scoped(key);
        match self.backend.read(&key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "storage read failed");
                None
            }
        }
    }

    /// Parsed value for `key`, or `fallback` when missing or unreadable.
    pub fn read_json<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.try_read_json(key).unwrap_or(fallback)
    }

    /// Like [`read_json`](Self::read_json) but distinguishes "absent or
    /// unreadable" (`None`) from a parsed value.
    pub fn try_read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %self.scoped(key), error = %e, "stored value is not valid JSON");
                None
            }
        }
    }

    /// Serialize and store `value`. Never fails the caller.
    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> WriteOutcome {
        let scoped = self.scoped(key);
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|raw| self.backend.write(&scoped, &raw));
        match result {
            Ok(()) => {
                debug!(key = %scoped, "storage write ok");
                WriteOutcome::Written
            }
            Err(e) => {
                warn!(key = %scoped, error = %e, "storage write failed");
                if let Some(observer) = &self.observer {
                    observer(&scoped, &e);
                }
                WriteOutcome::Failed(e.to_string())
            }
        }
    }

    /// Load a whole document, or an empty one.
    pub fn load_document<T: DeserializeOwned>(&self, key: StorageKey) -> Vec<T> {
        self.read_json(key.as_str(), Vec::new())
    }

    pub fn save_document<T: Serialize>(&self, key: StorageKey, items: &[T]) -> WriteOutcome {
        self.write_json(key.as_str(), items)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::{json, Value};

    use super::*;

    struct Broken;

    impl KeyValueBackend for Broken {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk gone")))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk gone")))
        }
    }

    #[test]
    fn read_json_returns_fallback_when_missing() {
        let storage = StorageAdapter::in_memory("test");
        let value: Vec<u32> = storage.read_json("nothing", vec![7]);
        assert_eq!(value, vec![7]);
    }

    #[test]
    fn read_json_returns_fallback_on_garbage() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("test:courses", "{oops").unwrap();
        let storage = StorageAdapter::new(backend, "test");
        let value: Vec<u32> = storage.read_json("courses", Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn keys_are_scoped() {
        let backend = Arc::new(MemoryBackend::new());
        let a = StorageAdapter::new(backend.clone(), "a");
        let b = StorageAdapter::new(backend.clone(), "b");
        assert!(a.write_json("k", &1).is_written());
        assert!(b.write_json("k", &2).is_written());
        assert_eq!(a.read_json("k", 0), 1);
        assert_eq!(b.read_json("k", 0), 2);
        assert_eq!(backend.read("a:k").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn failed_write_is_reported_not_raised() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let storage = StorageAdapter::new(Arc::new(Broken), "test").with_observer(move |key, _err| {
            assert_eq!(key, "test:courses");
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let outcome = storage.write_json("courses", &json!([1, 2]));

        assert!(matches!(outcome, WriteOutcome::Failed(ref msg) if msg.contains("disk gone")));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(storage.read_json("courses", 5), 5);
    }

    #[test]
    fn documents_are_independent() {
        let storage = StorageAdapter::in_memory("app");
        storage.save_document(StorageKey::Users, &[json!({"name": "ana"})]);
        storage.save_document(StorageKey::InviteCodes, &[json!("ABC-123")]);

        let users: Vec<Value> = storage.load_document(StorageKey::Users);
        let codes: Vec<String> = storage.load_document(StorageKey::InviteCodes);
        let sessions: Vec<Value> = storage.load_document(StorageKey::LiveSessions);

        assert_eq!(users, vec![json!({"name": "ana"})]);
        assert_eq!(codes, vec!["ABC-123".to_string()]);
        assert!(sessions.is_empty());
    }

    #[test]
    fn file_backend_round_trips_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested");
        {
            let storage = StorageAdapter::new(Arc::new(FileBackend::new(&path)), "app");
            assert!(storage.write_json(StorageKey::Schedule.as_str(), &json!({"mon": ["9:00"]})).is_written());
        }
        let reopened = StorageAdapter::new(Arc::new(FileBackend::new(&path)), "app");
        let value: Value = reopened.read_json("schedule", Value::Null);
        assert_eq!(value, json!({"mon": ["9:00"]}));
        assert!(path.join("app_schedule.json").exists());
    }

    #[test]
    fn file_backend_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        assert!(backend.read("absent").unwrap().is_none());
    }
}
