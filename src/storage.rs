//! Browser storage for the tour's two boolean flags.
//!
//! The page exposes two scopes: durable storage that survives reloads and
//! session storage that lives as long as the tab session. Both are reached
//! through [`KeyValueStore`] so the engine can run against in-memory stores
//! in tests and against `localStorage`/`sessionStorage` bindings in the page.
//!
//! Flags are stored as the literal string `"true"`; absence means false.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::error::StorageError;

/// Storage key names.
pub mod storage_keys {
    /// Durable (and session-mirrored) completion flag.
    pub const COMPLETED: &str = "workforce_tour_completed";
    /// Session-scoped "auto-start already evaluated" flag.
    pub const SESSION_STARTED: &str = "workforce_tour_session_started";
}

const TRUE: &str = "true";

/// A string key/value store with one scope (durable or session).
pub trait KeyValueStore: Send + Sync {
    /// Scope name used in log lines and errors.
    fn scope(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store. Stands in for browser storage in tests and for pages
/// where storage is sandboxed per load.
#[derive(Debug, Default)]
pub struct MemoryStore {
    scope: String,
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries.lock().map_err(|_| StorageError::Unavailable {
            scope: self.scope.clone(),
        })
    }
}

impl KeyValueStore for MemoryStore {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Storage that the user has disabled. Every call fails.
#[derive(Debug)]
pub struct UnavailableStore {
    scope: String,
}

impl UnavailableStore {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }

    fn error(&self) -> StorageError {
        StorageError::Unavailable {
            scope: self.scope.clone(),
        }
    }
}

impl KeyValueStore for UnavailableStore {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(self.error())
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(self.error())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(self.error())
    }
}

/// The tour's persisted flags on top of a durable and a session store.
///
/// Never returns errors: unreadable storage reads as "flag absent" and
/// failed writes are logged.
#[derive(Clone)]
pub struct TourFlags {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl TourFlags {
    pub fn new(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    /// Fresh in-memory durable and session stores.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::new("durable")),
            Arc::new(MemoryStore::new("session")),
        )
    }

    /// Whether the tour was completed on this device. The session copy is
    /// consulted when durable storage is missing the flag or unreadable.
    pub fn is_completed(&self) -> bool {
        read_flag(self.durable.as_ref(), storage_keys::COMPLETED)
            || read_flag(self.session.as_ref(), storage_keys::COMPLETED)
    }

    pub fn mark_completed(&self) {
        write_flag(self.durable.as_ref(), storage_keys::COMPLETED);
        write_flag(self.session.as_ref(), storage_keys::COMPLETED);
    }

    pub fn clear_completed(&self) {
        clear_flag(self.durable.as_ref(), storage_keys::COMPLETED);
        clear_flag(self.session.as_ref(), storage_keys::COMPLETED);
    }

    pub fn session_started(&self) -> bool {
        read_flag(self.session.as_ref(), storage_keys::SESSION_STARTED)
    }

    pub fn mark_session_started(&self) {
        write_flag(self.session.as_ref(), storage_keys::SESSION_STARTED);
    }
}

impl std::fmt::Debug for TourFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourFlags")
            .field("durable", &self.durable.scope())
            .field("session", &self.session.scope())
            .finish()
    }
}

fn read_flag(store: &dyn KeyValueStore, key: &str) -> bool {
    match store.get(key) {
        Ok(value) => value.as_deref() == Some(TRUE),
        Err(e) => {
            warn!("Treating {} as absent: {}", key, e);
            false
        }
    }
}

fn write_flag(store: &dyn KeyValueStore, key: &str) {
    if let Err(e) = store.set(key, TRUE) {
        warn!("Failed to persist {}: {}", key, e);
    }
}

fn clear_flag(store: &dyn KeyValueStore, key: &str) {
    if let Err(e) = store.remove(key) {
        warn!("Failed to clear {}: {}", key, e);
    }
}
