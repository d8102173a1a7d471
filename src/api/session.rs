//! Bearer token storage.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    access_token: Option<String>,
    email: Option<String>,
}

/// The signed-in user's token, kept in memory and optionally on disk.
#[derive(Debug, Default)]
pub struct Session {
    inner: RwLock<StoredSession>,
    path: Option<PathBuf>,
}

impl Session {
    /// An in-memory session that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load a session from `path`, starting empty if the file is missing or
    /// unreadable.
    pub fn load(path: PathBuf) -> Self {
        let stored = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(stored) => Some(stored),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt session file");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            inner: RwLock::new(stored),
            path: Some(path),
        }
    }

    /// Default session file under the data directory.
    pub fn default_path() -> Result<PathBuf> {
        Ok(crate::config::data_dir()?.join("session.json"))
    }

    /// Current bearer token.
    pub fn token(&self) -> Option<String> {
        self.read(|s| s.access_token.clone())
    }

    /// Email of the signed-in user, if known.
    pub fn email(&self) -> Option<String> {
        self.read(|s| s.email.clone())
    }

    /// Whether a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.read(|s| s.access_token.is_some())
    }

    /// Store a new token and persist it.
    pub fn set_token(&self, token: impl Into<String>, email: Option<String>) -> Result<()> {
        self.write(|s| {
            s.access_token = Some(token.into());
            s.email = email;
        })
    }

    /// Forget the token and persist the empty session.
    pub fn clear(&self) -> Result<()> {
        self.write(|s| *s = StoredSession::default())
    }

    fn read<T>(&self, f: impl FnOnce(&StoredSession) -> T) -> T {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write(&self, f: impl FnOnce(&mut StoredSession)) -> Result<()> {
        let content = {
            let mut guard = match self.inner.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            f(&mut guard);
            serde_json::to_string_pretty(&*guard)?
        };

        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        Ok(())
    }
}
