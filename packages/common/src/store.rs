use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::{CommonError, CommonResult};

/// Key-value byte store used to persist serialized documents
pub trait KeyValueStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous value
    fn save(&self, key: &str, bytes: &[u8]) -> CommonResult<()>;

    /// Read the value stored under `key`, if any
    fn load(&self, key: &str) -> CommonResult<Option<Vec<u8>>>;
}

/// Reject keys that could escape the store root
pub fn validate_key(key: &str) -> CommonResult<()> {
    let invalid = key.is_empty()
        || key == "."
        || key.contains("..")
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0');

    if invalid {
        Err(CommonError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

/// Directory-backed store, one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> CommonResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn save(&self, key: &str, bytes: &[u8]) -> CommonResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)?;

        // Write-then-rename so a crash mid-write never leaves a truncated file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &path)?;

        tracing::debug!(key, bytes = bytes.len(), "saved to file store");
        Ok(())
    }

    fn load(&self, key: &str) -> CommonResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls since creation
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raw value for `key` as UTF-8, if present
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&self, key: &str, bytes: &[u8]) -> CommonResult<()> {
        validate_key(key)?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), bytes.to_vec());
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }

    fn load(&self, key: &str) -> CommonResult<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("document").is_ok());
        assert!(validate_key("notes-2024").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("a\\b").is_err());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.load("doc").unwrap(), None);

        store.save("doc", b"{\"title\":\"a\"}").unwrap();
        assert_eq!(store.load("doc").unwrap(), Some(b"{\"title\":\"a\"}".to_vec()));

        // Overwrite
        store.save("doc", b"{}").unwrap();
        assert_eq!(store.load("doc").unwrap(), Some(b"{}".to_vec()));
        assert!(!dir.path().join("nested").join("doc.json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_bad_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let err = store.save("../outside", b"x").unwrap_err();
        assert!(matches!(err, CommonError::InvalidKey(_)));
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let store = MemoryStore::new();
        assert_eq!(store.save_count(), 0);

        store.save("doc", b"one").unwrap();
        store.save("doc", b"two").unwrap();

        assert_eq!(store.save_count(), 2);
        assert_eq!(store.get_string("doc"), Some("two".to_string()));
        assert_eq!(store.load("missing").unwrap(), None);
    }
}
