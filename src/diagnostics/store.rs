//! Durable key-value storage for persisted diagnostics.
//!
//! [`FileStore`] keeps every key in one JSON object on disk, rewritten on
//! each `set`. [`MemoryStore`] keeps them in a map and can enforce a byte
//! quota, which is how tests exercise the "storage full" path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// JSON object on disk. A missing file reads as empty.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value.to_string());
        self.write_all(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}

/// In-memory store with an optional quota on the total size of keys and
/// values, in bytes.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            map: Mutex::new(BTreeMap::new()),
            quota: Some(quota),
        }
    }

    fn used_bytes(map: &BTreeMap<String, String>) -> usize {
        map.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(quota) = self.quota {
            let existing = map.get(key).map_or(0, |v| key.len() + v.len());
            let needed = Self::used_bytes(&map) - existing + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.map
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_missing_file_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("kv.json"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state/kv.json");

        FileStore::new(&path).set("debug_logs", "[]").unwrap();
        FileStore::new(&path).set("other", "x").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get("debug_logs").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn file_store_remove() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("kv.json"));
        store.set("a", "1").unwrap();
        store.remove("a").unwrap();
        store.remove("never-set").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn file_store_corrupt_file_is_json_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kv.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            FileStore::new(&path).get("a"),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn memory_store_quota() {
        let store = MemoryStore::with_quota(10);
        store.set("k", "12345").unwrap();
        // Replacing a value only counts the new size.
        store.set("k", "123456789").unwrap();
        let err = store.set("k2", "x").unwrap_err();
        assert!(matches!(
            err,
            StoreError::QuotaExceeded {
                needed: 13,
                quota: 10
            }
        ));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("123456789"));
    }

    #[test]
    fn memory_store_unlimited_by_default() {
        let store = MemoryStore::new();
        store.set("big", &"x".repeat(1 << 16)).unwrap();
        store.remove("big").unwrap();
        assert_eq!(store.get("big").unwrap(), None);
    }
}
