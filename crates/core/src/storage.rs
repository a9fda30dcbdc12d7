//! Client-local key/value storage for the persisted access token

use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage key under which the access token is persisted
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Local storage backend, keyed by fixed names
pub trait TokenStorage: Send + Sync {
    fn load(&self, key: &str) -> CoreResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> CoreResult<()>;
    fn remove(&self, key: &str) -> CoreResult<()>;
}

/// In-memory storage, lost with the process
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::storage_error("memory storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::storage_error("memory storage lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::storage_error("memory storage lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object on disk
///
/// Every operation re-reads the file so that separate processes sharing the
/// same data directory observe each other's writes.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Storage file `storage.json` inside the given directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> CoreResult<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| CoreError::storage_error("file storage lock poisoned"))?;
        Ok(self.read_entries()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> CoreResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| CoreError::storage_error("file storage lock poisoned"))?;
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| CoreError::storage_error("file storage lock poisoned"))?;
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
