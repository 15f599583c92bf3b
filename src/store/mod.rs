//! Durable key/value stores carrying the pending specification across a
//! restart.

use architect_common::{KeyValueStore, StoreError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Fixed key under which the confirmed specification waits for generation.
pub const PENDING_SPEC_KEY: &str = "architect.pendingSpec";

/// One JSON file per key inside a state directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`. Characters outside `[A-Za-z0-9._-]`
    /// map to `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn store(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| Self::io_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(&path, e))?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }
}

/// In-process store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn store(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::LockPoisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::LockPoisoned)?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state"));

        assert_eq!(store.load(PENDING_SPEC_KEY).unwrap(), None);
        store.store(PENDING_SPEC_KEY, r#"{"a":1}"#).unwrap();
        assert_eq!(
            store.load(PENDING_SPEC_KEY).unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );

        store.store(PENDING_SPEC_KEY, "second").unwrap();
        assert_eq!(store.load(PENDING_SPEC_KEY).unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_file_store_remove_absent_is_ok() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.remove("missing").unwrap();

        store.store("k", "v").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.load("k").unwrap(), None);
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let store = FileStore::new(PathBuf::from("/state"));
        assert_eq!(
            store.path_for("architect.pendingSpec"),
            PathBuf::from("/state/architect.pendingSpec.json")
        );
        assert_eq!(store.path_for("../x/y"), PathBuf::from("/state/.._x_y.json"));
    }

    #[test]
    fn test_file_store_load_error_reports_path() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        // A directory where the file should be makes the read fail.
        std::fs::create_dir_all(store.path_for("k")).unwrap();
        match store.load("k") {
            Err(StoreError::Io { path, .. }) => assert_eq!(path, store.path_for("k")),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        store.store("k", "v").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.load("k").unwrap(), None);
    }
}
