use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{BumpError, Result};
use crate::store::DocumentStore;

/// In-memory store for testing without touching the filesystem
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        MemoryStore {
            files: Mutex::new(HashMap::new()),
        }
    }

    /// Add or replace a file
    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), text.into());
        }
    }

    /// Current text of a file, if present
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .lock()
            .ok()
            .and_then(|files| files.get(path.as_ref()).cloned())
    }

    pub fn len(&self) -> usize {
        self.files.lock().map_or(0, |files| files.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<String> {
        self.get(path)
            .ok_or_else(|| BumpError::FileNotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, text: &str) -> Result<()> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| BumpError::config("memory store lock poisoned"))?;
        files.insert(path.to_path_buf(), text.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basic() {
        let store = MemoryStore::new();
        store.insert("a.yaml", "a: 1\n");

        assert!(store.exists(Path::new("a.yaml")));
        assert_eq!(store.read(Path::new("a.yaml")).unwrap(), "a: 1\n");

        store.write(Path::new("a.yaml"), "a: 2\n").unwrap();
        assert_eq!(store.get("a.yaml").as_deref(), Some("a: 2\n"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_missing() {
        let store = MemoryStore::default();
        assert!(store.is_empty());
        assert!(matches!(
            store.read(Path::new("nope.yaml")),
            Err(BumpError::FileNotFound(_))
        ));
    }
}
