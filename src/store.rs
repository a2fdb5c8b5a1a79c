//! Durable session-token storage.
//!
//! Storage must survive process restart. No expiry is enforced locally —
//! whether a stored token is still good is only ever determined by asking
//! the backend.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::token::SessionToken;

/// Storage abstraction for the persisted session token.
///
/// Reads are safe to issue concurrently; writes are serialized by the
/// implementation. Last-write-wins is acceptable since only the session
/// manager writes.
pub trait TokenStore: Send + Sync {
    /// Authoritative read from the backing medium.
    fn load(&self) -> Result<Option<SessionToken>, StoreError>;

    /// Overwrite the stored token. Exactly one token exists per install.
    fn save(&self, token: &SessionToken) -> Result<(), StoreError>;

    /// Remove the stored token. A no-op when nothing is stored.
    fn clear(&self) -> Result<(), StoreError>;

    /// Best-effort read of the last value seen, without touching the
    /// backing medium.
    fn peek(&self) -> Option<SessionToken>;
}

/// Configuration for file-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStoreConfig {
    pub base_dir: PathBuf,
}

impl TokenStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_signet_dir()
    }
}

/// Session file name under the store's base directory.
const SESSION_FILE: &str = "session.toml";

/// File-backed token store holding one versioned TOML file.
///
/// The file is created `0o600` on Unix. A small in-memory cache backs
/// [`TokenStore::peek`]; it is refreshed by every load, save, and clear.
pub struct FileTokenStore {
    base_dir: PathBuf,
    cached: Mutex<Option<SessionToken>>,
}

impl FileTokenStore {
    pub fn new(config: TokenStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
            cached: Mutex::new(None),
        }
    }

    pub fn new_default() -> Self {
        Self::new(TokenStoreConfig::new(default_signet_dir()))
    }

    fn session_path(&self) -> PathBuf {
        self.base_dir.join(SESSION_FILE)
    }

    fn ensure_parent(path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn remember(&self, value: Option<SessionToken>) {
        let mut guard = self.cached.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = value;
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, StoreError> {
        let path = self.session_path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                self.remember(None);
                return Ok(None);
            }
            Err(err) => return Err(StoreError::Io(err.to_string())),
        };
        let file: SessionFile = toml::from_str(&raw)?;
        let token = SessionToken::new(file.token);
        self.remember(Some(token.clone()));
        Ok(Some(token))
    }

    fn save(&self, token: &SessionToken) -> Result<(), StoreError> {
        let path = self.session_path();
        Self::ensure_parent(&path)?;
        let file = SessionFile {
            version: 1,
            token: token.as_str().to_string(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        self.remember(Some(token.clone()));
        debug!(path = %path.display(), "session token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.remember(None);
        let path = self.session_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err.to_string())),
        }
    }

    fn peek(&self) -> Option<SessionToken> {
        let guard = self.cached.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    token: String,
    saved_at: DateTime<Utc>,
}

fn default_signet_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".signet"))
        .unwrap_or_else(|| PathBuf::from(".signet"))
}
