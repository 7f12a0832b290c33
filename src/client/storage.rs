//! # Session Storage
//!
//! String key/value storage with the shape of browser local storage.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::errors::{ClientError, ClientResult};

/// Name of the file backing [`FileSessionStorage`]
pub const SESSION_FILE: &str = "session.json";

/// Key/value storage for client session state
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> ClientResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> ClientResult<()>;
    fn remove_item(&self, key: &str) -> ClientResult<()>;
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> ClientResult<Option<String>> {
        let items = self.items.read().map_err(|_| ClientError::LockPoisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut items = self.items.write().map_err(|_| ClientError::LockPoisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> ClientResult<()> {
        let mut items = self.items.write().map_err(|_| ClientError::LockPoisoned)?;
        items.remove(key);
        Ok(())
    }
}

/// Storage persisted as a JSON object in `<dir>/session.json`
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    /// Storage rooted at a directory (created on first write)
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> ClientResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| ClientError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ClientError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, content).map_err(|source| ClientError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> ClientResult<()> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(storage: &dyn SessionStorage) {
        assert_eq!(storage.get_item("user").unwrap(), None);
        storage.set_item("user", "{}").unwrap();
        assert_eq!(storage.get_item("user").unwrap().as_deref(), Some("{}"));
        storage.remove_item("user").unwrap();
        assert_eq!(storage.get_item("user").unwrap(), None);
        storage.remove_item("never-set").unwrap();
    }

    #[test]
    fn test_memory_storage() {
        exercise(&MemorySessionStorage::new());
    }

    #[test]
    fn test_file_storage() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested");
        exercise(&FileSessionStorage::new(&dir));
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        FileSessionStorage::new(temp_dir.path())
            .set_item("token", "abc")
            .unwrap();

        let reopened = FileSessionStorage::new(temp_dir.path());
        assert_eq!(reopened.get_item("token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(temp_dir.path());
        fs::write(storage.path(), "not json").unwrap();
        assert!(matches!(
            storage.get_item("user"),
            Err(ClientError::Serialization(_))
        ));
    }
}
