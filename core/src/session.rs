//! Durable session state: the credential and the cached profile.
//!
//! # Design
//! The backing store is a plain string key/value surface ([`Storage`]) so a
//! session can live in memory for tests and short-lived embedders or on disk
//! for durability. [`SessionContext`] is the typed view every component
//! shares: it owns the two fixed keys, serializes the profile, and degrades
//! missing or corrupt data to `None` instead of failing. It is the only
//! locally-owned mutable state in the crate.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ApiError;
use crate::types::User;

/// Storage key for the bearer credential.
pub const TOKEN_KEY: &str = "borrow_auth_token";

/// Storage key for the serialized profile of the logged-in user.
pub const USER_KEY: &str = "borrow_user";

/// String key/value store backing a session.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store; entries vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned lock only means another thread panicked mid-write;
        // string entries are still usable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

/// Durable store: one file per key under a directory.
///
/// I/O trouble degrades instead of propagating: unreadable entries read as
/// absent, failed writes are logged and dropped. The session layer must not
/// take the client down over a bad disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!(error = %e, dir = %self.dir.display(), "session directory unavailable");
            return;
        }
        if let Err(e) = fs::write(self.entry_path(key), value) {
            tracing::warn!(error = %e, key, "failed to persist session entry");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = fs::remove_file(self.entry_path(key)) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(error = %e, key, "failed to remove session entry");
            }
        }
    }
}

/// Shared, typed view of the session entries.
///
/// Cloning is cheap; clones observe the same underlying store. No
/// transaction spans multiple accesses, so a consumer must tolerate the
/// store being cleared or rewritten between its own reads.
#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<dyn Storage>,
}

impl SessionContext {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Fresh in-memory session.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Store a credential and its user profile.
    ///
    /// The profile is serialized before anything is written, so a
    /// serialization failure leaves the store untouched.
    pub fn write(&self, token: &str, user: &User) -> Result<(), ApiError> {
        let profile =
            serde_json::to_string(user).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.storage.set(TOKEN_KEY, token);
        self.storage.set(USER_KEY, &profile);
        Ok(())
    }

    /// Drop both entries. Idempotent: clearing an empty session is a no-op,
    /// never an error.
    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USER_KEY);
    }

    /// The raw stored credential, if any.
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    /// The cached profile. Absent or unparsable data reads as `None`.
    pub fn user(&self) -> Option<User> {
        let raw = self.storage.get(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    /// Whether a credential is present. Presence only; the token is not
    /// inspected for expiry or validity.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Deliberately omits the token.
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
