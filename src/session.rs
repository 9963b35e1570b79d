//! Session persistence. The store wraps an injected key-value backend, the
//! native stand-in for origin-scoped browser storage, and owns three
//! entries: the session token, an optional refresh token, and a
//! denormalized user record. Construct one store at startup and share it;
//! `clear()` removes all entries under a single lock so no partial state is
//! observable. Token material must never be logged.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::ApiError;

const SESSION_TOKEN_KEY: &str = "session_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";
const USER_KEY: &str = "user";

/// Key-value persistence seam behind the session store.
///
/// Implementations are expected to be origin- or profile-scoped: one logical
/// storage area per user of the embedding application.
pub trait StorageBackend: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Ephemeral backend for tests and embedders that manage persistence
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// File-backed storage: one JSON document, loaded at open and written
/// through on every mutation. Write failures are logged and the in-memory
/// view stays authoritative for the life of the process.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStorage {
    /// Opens the document at `path`, starting empty when the file does not
    /// exist yet.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be read or holds
    /// something other than a string-to-string JSON object.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|err| {
                ApiError::Config(format!("cannot read session file {}: {err}", path.display()))
            })?;
            serde_json::from_str(&raw).map_err(|err| {
                ApiError::Config(format!(
                    "session file {} is not a JSON object: {err}",
                    path.display()
                ))
            })?
        } else {
            HashMap::new()
        };

        Ok(Self { path, entries })
    }

    fn persist(&self) {
        let document = match serde_json::to_string_pretty(&self.entries) {
            Ok(document) => document,
            Err(err) => {
                warn!("cannot encode session file: {err}");
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, document) {
            warn!("cannot write session file {}: {err}", self.path.display());
        }
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.persist();
    }
}

/// Denormalized display data for the signed-in user. Invalidated together
/// with the session token; unknown fields from the server are dropped.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// The session store shared between the API client and the embedding
/// application.
pub struct SessionStore {
    backend: Mutex<Box<dyn StorageBackend>>,
}

impl SessionStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Mutex::new(Box::new(backend)),
        }
    }

    /// Store backed by process memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Current session token, if a non-empty one is stored.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.backend()
            .get(SESSION_TOKEN_KEY)
            .filter(|token| !token.is_empty())
            .map(SecretString::from)
    }

    pub fn set_token(&self, token: SecretString) {
        self.backend().set(SESSION_TOKEN_KEY, token.expose_secret());
    }

    /// Current refresh token, if a non-empty one is stored.
    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.backend()
            .get(REFRESH_TOKEN_KEY)
            .filter(|token| !token.is_empty())
            .map(SecretString::from)
    }

    pub fn set_refresh_token(&self, token: SecretString) {
        self.backend().set(REFRESH_TOKEN_KEY, token.expose_secret());
    }

    /// Stored user record, if present and decodable.
    #[must_use]
    pub fn user(&self) -> Option<UserRecord> {
        let raw = self.backend().get(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn set_user(&self, user: &UserRecord) {
        match serde_json::to_string(user) {
            Ok(encoded) => self.backend().set(USER_KEY, &encoded),
            Err(err) => warn!("cannot encode user record: {err}"),
        }
    }

    /// Removes token, refresh token, and user record under one lock.
    pub fn clear(&self) {
        let mut backend = self.backend();
        backend.remove(SESSION_TOKEN_KEY);
        backend.remove(REFRESH_TOKEN_KEY);
        backend.remove(USER_KEY);
    }

    /// True iff a non-empty session token is present.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.token().is_some()
    }

    fn backend(&self) -> MutexGuard<'_, Box<dyn StorageBackend>> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("token", &self.token().map(|_| "***"))
            .field("user", &self.user())
            .finish()
    }
}
