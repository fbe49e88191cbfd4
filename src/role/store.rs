//! Persisted key-value store for the role cache.
//!
//! Values are opaque strings (JSON in practice); the cache owns the format.

use std::io::ErrorKind;
use std::path::PathBuf;

use dashmap::DashMap;

use crate::role::StoreError;

pub trait RoleStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoleStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key);
        Ok(())
    }
}

/// One file per key under a directory, so entries survive restarts.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl RoleStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn RoleStore) {
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", r#"{"a":1}"#).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(r#"{"a":1}"#));

        store.set("k", r#"{"a":2}"#).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(r#"{"a":2}"#));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_file_store() {
        let dir = std::env::temp_dir().join(format!("exgen-store-{}", uuid::Uuid::new_v4()));
        let store = FileStore::new(&dir);
        exercise(&store);

        store.set("persisted", "v").unwrap();
        assert_eq!(FileStore::new(&dir).get("persisted").unwrap().as_deref(), Some("v"));

        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }
}
