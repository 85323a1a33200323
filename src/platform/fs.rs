// RegSift - platform/fs.rs
//
// Filesystem access and the key-value store used for local persistence.
//
// Every stored value lives in its own `<key>.json` file under the store
// directory. Writes are atomic (write temp -> rename) so an interrupted save
// never corrupts the previous value.

use crate::util::constants;
use crate::util::error::PersistenceError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Read the full content of a file as a string.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `contents` to `path` via a sibling temp file and a rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        e
    })
}

// =============================================================================
// Key-value store
// =============================================================================

/// A string-valued store addressed by fixed keys.
///
/// `read` returns `Ok(None)` for a key that was never written.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// File-backed store: one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{key}.{}", constants::STORE_FILE_EXTENSION))
    }
}

impl KeyValueStore for FileKvStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => {
                tracing::trace!(key, path = %path.display(), bytes = value.len(), "Store read");
                Ok(Some(value))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::Read {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        write_atomic(&path, value.as_bytes()).map_err(|e| PersistenceError::Write {
            key: key.to_string(),
            source: e,
        })?;
        tracing::trace!(key, path = %path.display(), bytes = value.len(), "Store write");
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one value.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryKvStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).write(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileKvStore::new(dir.path());
        assert_eq!(store.read("absent").unwrap(), None);
    }

    #[test]
    fn test_file_store_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = FileKvStore::new(dir.path().join("nested"));
        store.write("k", r#"{"a":1}"#).unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert!(store.path_for("k").ends_with("nested/k.json"));
    }

    #[test]
    fn test_write_atomic_replaces_stale_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.json");
        std::fs::write(dir.path().join("v.json.tmp"), b"garbage").unwrap();
        write_atomic(&path, b"fresh").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh");
        assert!(!dir.path().join("v.json.tmp").exists());
    }

    #[test]
    fn test_read_file_lossy_replaces_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, [b'o', b'k', 0xff]).unwrap();
        let text = read_file_lossy(&path).unwrap();
        assert!(text.starts_with("ok"));
        assert!(text.contains('\u{fffd}'));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryKvStore::with_value("a", "1");
        assert_eq!(store.read("a").unwrap().as_deref(), Some("1"));
        store.write("a", "2").unwrap();
        assert_eq!((&store).read("a").unwrap().as_deref(), Some("2"));
    }
}
