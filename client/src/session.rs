//! Session context and the key/value storage that persists it.
//!
//! The stored layout is three string values: `isAuthenticated`, `userEmail`
//! and `accessToken`. Nothing else is persisted.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::error::SessionError;

pub const IS_AUTHENTICATED_KEY: &str = "isAuthenticated";
pub const USER_EMAIL_KEY: &str = "userEmail";
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// The signed-in user. Created by a successful login, dropped on logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub access_token: String,
}

impl Session {
    pub fn new(email: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            access_token: access_token.into(),
        }
    }
}

/// String-valued persistent storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.values().remove(key);
        Ok(())
    }
}

/// A JSON object of strings on disk. Every write replaces the file through a
/// temporary sibling and a rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<HashMap<String, String>, SessionError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, values: &HashMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(values)?)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, String>)) -> Result<(), SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut values = self.read()?;
        f(&mut values);
        self.write(&values)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

/// Creates, reads and destroys the [`Session`] in a [`KeyValueStore`].
pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileStore::new(path))
    }

    /// Writes the session. On any failure the partial write is cleared so no
    /// half-written session is left signed in.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Err(e) = self.write_session(session) {
            if let Err(clear_err) = self.clear() {
                warn!(error = %clear_err, "could not roll back partial session");
            }
            return Err(e);
        }
        info!(email = %session.email, "session created");
        Ok(())
    }

    fn write_session(&self, session: &Session) -> Result<(), SessionError> {
        self.backend.set(USER_EMAIL_KEY, &session.email)?;
        self.backend.set(ACCESS_TOKEN_KEY, &session.access_token)?;
        // flag goes last: load() only trusts a session once it is set
        self.backend.set(IS_AUTHENTICATED_KEY, "true")
    }

    /// The current session, if the authentication flag is set. A missing
    /// email or token loads as an empty string.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        if self.backend.get(IS_AUTHENTICATED_KEY)?.as_deref() != Some("true") {
            debug!("no authenticated session");
            return Ok(None);
        }

        let email = self.backend.get(USER_EMAIL_KEY)?.unwrap_or_default();
        let access_token = self.backend.get(ACCESS_TOKEN_KEY)?.unwrap_or_default();
        Ok(Some(Session {
            email,
            access_token,
        }))
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        self.backend.remove(IS_AUTHENTICATED_KEY)?;
        self.backend.remove(USER_EMAIL_KEY)?;
        self.backend.remove(ACCESS_TOKEN_KEY)?;
        info!("session cleared");
        Ok(())
    }

    /// Raw access to a stored value.
    pub fn raw(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.backend.get(key)
    }
}
