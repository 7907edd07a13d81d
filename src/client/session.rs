use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// What the client remembers between runs: the token and who it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub username: String,
}

/// Where a client session is persisted.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionData>>;
    fn save(&self, data: &SessionData) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    data: Mutex<Option<SessionData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionData>> {
        let data = self.data.lock().map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
        Ok(data.clone())
    }

    fn save(&self, session: &SessionData) -> Result<()> {
        let mut data = self.data.lock().map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
        *data = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut data = self.data.lock().map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
        *data = None;
        Ok(())
    }
}

/// JSON file holding `{token, username}`.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionData>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read session file")?;
        let data = serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(data))
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// The client's explicit session: loaded once from its store and written
/// through on every change.
pub struct ClientSession {
    store: Box<dyn SessionStore>,
    data: Option<SessionData>,
}

impl ClientSession {
    pub fn new(store: Box<dyn SessionStore>) -> Result<Self> {
        let data = store.load()?;
        Ok(Self { store, data })
    }

    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemorySessionStore::new()),
            data: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.username.as_str())
    }

    pub fn is_logged_in(&self) -> bool {
        self.data.is_some()
    }

    pub fn set(&mut self, data: SessionData) -> Result<()> {
        self.store.save(&data)?;
        self.data = Some(data);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        self.store.clear()
    }
}
