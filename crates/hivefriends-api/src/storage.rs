// Persisted session storage
//
// The bearer token and the serialized user record live under two
// well-known keys in a small key-value store. The client reads the token
// from here on every request, so a sign-in or a teardown made elsewhere is
// picked up by the very next call. Writes are last-write-wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use secrecy::SecretString;
use tracing::{debug, warn};

use crate::error::Error;

/// Key holding the opaque bearer token string.
pub const BEARER_TOKEN_KEY: &str = "bearer_token";

/// Key holding the JSON-serialized signed-in user record.
pub const USER_KEY: &str = "user";

/// Key-value store backing the persisted session.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    fn remove(&self, key: &str) -> Result<(), Error>;

    /// The persisted bearer token, if any. Empty strings count as absent.
    fn bearer_token(&self) -> Option<SecretString> {
        self.get(BEARER_TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    /// Remove both session keys. Failures are logged, not returned: a
    /// teardown must never leave the caller stuck.
    fn clear_session(&self) {
        for key in [USER_KEY, BEARER_TOKEN_KEY] {
            if let Err(e) = self.remove(key) {
                warn!(key, error = %e, "failed to clear persisted session key");
            }
        }
    }
}

// ── In-memory storage ───────────────────────────────────────────────

/// Process-local storage. Used by tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.entries.remove(key);
        Ok(())
    }
}

// ── File-backed storage ─────────────────────────────────────────────

/// JSON file storage, one flat object of string values.
///
/// Every operation re-reads the file. There is no locking; concurrent
/// writers race and the last one wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable session file");
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "corrupt session file, ignoring");
            BTreeMap::new()
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Storage(e.to_string()))?;
        }
        let body = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, body).map_err(|e| Error::Storage(e.to_string()))?;
        debug!(path = %self.path.display(), "session file written");
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut entries = self.load();
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut entries = self.load();
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(&entries)
    }
}
