// vitrine/src/storage/mod.rs

//! Local key-value persistence shared by the guest cart and the draft store.
//!
//! Both stores only ever talk to a `KeyValueStore`, so TTL and eviction rules
//! can be exercised against `MemoryStore` while the app persists to disk with
//! `FileStore`.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageError;
use std::sync::Arc;

/// Minimal string-keyed storage contract, modeled on browser local storage.
pub trait KeyValueStore: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

  /// Writes `value` under `key`. Fails with `StorageError::QuotaExceeded` when
  /// the backend has no room left for the entry.
  fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

  /// Removes `key`. Removing an absent key is not an error.
  fn delete(&self, key: &str) -> Result<(), StorageError>;

  fn keys(&self) -> Result<Vec<String>, StorageError>;

  /// Bytes currently held, counted as key length plus value length per entry.
  fn used_bytes(&self) -> Result<usize, StorageError> {
    let mut total = 0usize;
    for key in self.keys()? {
      if let Some(value) = self.get(&key)? {
        total += entry_size(&key, &value);
      }
    }
    Ok(total)
  }
}

pub type SharedStore = Arc<dyn KeyValueStore>;

pub fn entry_size(key: &str, value: &str) -> usize {
  key.len() + value.len()
}
