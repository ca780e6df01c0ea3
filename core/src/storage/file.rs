// vitrine/src/storage/file.rs

use super::{KeyValueStore, MemoryStore};
use crate::error::StorageError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A `KeyValueStore` persisted as a single JSON object on disk.
///
/// Reads are served from memory. Every mutation rewrites the file through a
/// temporary sibling followed by a rename, and is undone in memory when the
/// rewrite fails.
#[derive(Debug)]
pub struct FileStore {
  inner: MemoryStore,
  path: PathBuf,
  write_lock: Mutex<()>,
}

impl FileStore {
  /// Opens (or creates) the store at `path`. A missing or unreadable file
  /// starts an empty store; the next write replaces it.
  pub fn open(path: impl AsRef<Path>, capacity: Option<usize>) -> Self {
    let path = path.as_ref().to_path_buf();
    let entries = match std::fs::read(&path) {
      Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
        Ok(entries) => {
          debug!(path = %path.display(), entries = entries.len(), "Loaded storage file.");
          entries
        }
        Err(e) => {
          warn!(path = %path.display(), error = %e, "Storage file is corrupt, starting empty.");
          BTreeMap::new()
        }
      },
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
      Err(e) => {
        warn!(path = %path.display(), error = %e, "Storage file unreadable, starting empty.");
        BTreeMap::new()
      }
    };

    Self {
      inner: MemoryStore::from_entries(entries, capacity),
      path,
      write_lock: Mutex::new(()),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Applies `change` in memory and persists it, restoring the previous
  /// value of `key` if the file cannot be written.
  fn commit<F>(&self, key: &str, change: F) -> Result<(), StorageError>
  where
    F: FnOnce(&MemoryStore) -> Result<(), StorageError>,
  {
    let _guard = self.write_lock.lock();
    let previous = self.inner.get(key)?;
    change(&self.inner)?;
    if let Err(e) = self.flush() {
      warn!(path = %self.path.display(), key, error = %e, "Storage flush failed, rolling back.");
      self.inner.restore(key, previous);
      return Err(e);
    }
    Ok(())
  }

  fn flush(&self) -> Result<(), StorageError> {
    let body = serde_json::to_vec(&self.inner.snapshot()).map_err(|e| StorageError::Backend(e.to_string()))?;
    let tmp = self.path.with_extension("tmp");
    std::fs::write(&tmp, body)?;
    std::fs::rename(&tmp, &self.path)?;
    Ok(())
  }
}

impl KeyValueStore for FileStore {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    self.inner.get(key)
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    self.commit(key, |inner| inner.set(key, value))
  }

  fn delete(&self, key: &str) -> Result<(), StorageError> {
    self.commit(key, |inner| inner.delete(key))
  }

  fn keys(&self) -> Result<Vec<String>, StorageError> {
    self.inner.keys()
  }

  fn used_bytes(&self) -> Result<usize, StorageError> {
    self.inner.used_bytes()
  }
}
