use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Error type for key-value store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid store key '{0}': use letters, digits, '-' or '_'")]
    InvalidKey(String),
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A durable string-keyed store.
///
/// `get` returns `Ok(None)` when nothing has been written under the key.
/// `set` overwrites unconditionally.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Keys map to file names, so keep them to a safe alphabet.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::WriteError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(FileStore {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::ReadError { path, source: e }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let path = self.path_for(key);
        atomic_write(&path, value.as_bytes())
            .map_err(|e| StoreError::WriteError { path, source: e })
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A store that lives only as long as the process. Writes can be made to
/// fail on demand to exercise degraded persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    fail_writes: RefCell<bool>,
    writes: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with one value
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.borrow_mut() = fail;
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if *self.fail_writes.borrow() {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: KvStore + ?Sized> KvStore for std::rc::Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_get_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.get("todos").unwrap().is_none());
    }

    #[test]
    fn file_store_set_then_get() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("todos", "[]").unwrap();
        assert_eq!(store.get("todos").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("todos.json").exists());

        store.set("todos", "[1]").unwrap();
        assert_eq!(store.get("todos").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn file_store_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        let store = FileStore::open(&nested).unwrap();
        store.set("k", "v").unwrap();
        assert!(nested.join("k.json").exists());
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn memory_store_failing_writes() {
        let store = MemoryStore::new();
        store.set("k", "1").unwrap();
        store.set_fail_writes(true);
        assert!(store.set("k", "2").is_err());
        assert_eq!(store.raw("k").as_deref(), Some("1"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn atomic_write_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.json");
        atomic_write(&path, b"one").unwrap();
        atomic_write(&path, b"two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
    }
}
