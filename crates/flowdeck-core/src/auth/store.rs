//! Key-value credential stores.
//!
//! The session lives in a small key-value store shared by every view. Reads
//! and writes take no cross-process lock: the last writer wins.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};

/// Credentials file name in the cache directory
const CREDENTIALS_FILE: &str = "credentials.json";

/// Persistent key-value storage for session credentials.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Credentials kept as a JSON object on disk.
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self::at(cache_dir.join(CREDENTIALS_FILE))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read credentials file")?;
        serde_json::from_str(&contents).context("Failed to parse credentials file")
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove credentials file")?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents).context("Failed to write credentials file")?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("credential store lock poisoned"))?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("credential store lock poisoned"))?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("credential store lock poisoned"))?;
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// In-process store; nothing survives a restart.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("credential store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("credential store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("credential store lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = FileCredentialStore::new(dir.path());

        assert_eq!(store.get("token").expect("get"), None);

        store.set("token", "abc").expect("set token");
        store.set("user", r#"{"username":"ops"}"#).expect("set user");
        assert_eq!(store.get("token").expect("get"), Some("abc".to_string()));

        // A second handle on the same file sees the same data
        let other = FileCredentialStore::new(dir.path());
        assert_eq!(other.get("user").expect("get"), Some(r#"{"username":"ops"}"#.to_string()));

        store.remove("token").expect("remove token");
        assert_eq!(other.get("token").expect("get"), None);
        assert!(store.path().exists());

        store.remove("user").expect("remove user");
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = FileCredentialStore::new(dir.path());
        std::fs::write(store.path(), "not json").expect("write corrupt file");
        assert!(store.get("token").is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::new();
        assert!(store.is_empty());
        store.set("token", "abc").expect("set");
        store.set("token", "def").expect("overwrite");
        assert_eq!(store.get("token").expect("get"), Some("def".to_string()));
        assert_eq!(store.len(), 1);
        store.remove("token").expect("remove");
        store.remove("token").expect("remove missing key");
        assert!(store.is_empty());
    }
}
