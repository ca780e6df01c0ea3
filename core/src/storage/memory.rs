// vitrine/src/storage/memory.rs

use super::{entry_size, KeyValueStore};
use crate::error::StorageError;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-memory `KeyValueStore` with an optional byte capacity.
///
/// With a capacity set, a write that would push usage past it fails with
/// `StorageError::QuotaExceeded`, the same way a full browser storage does.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: RwLock<BTreeMap<String, String>>,
  capacity: Option<usize>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity_bytes(capacity: usize) -> Self {
    Self {
      entries: RwLock::new(BTreeMap::new()),
      capacity: Some(capacity),
    }
  }

  pub(crate) fn from_entries(entries: BTreeMap<String, String>, capacity: Option<usize>) -> Self {
    Self {
      entries: RwLock::new(entries),
      capacity,
    }
  }

  /// Puts `key` back to `previous` without a capacity check.
  pub(crate) fn restore(&self, key: &str, previous: Option<String>) {
    let mut guard = self.entries.write();
    match previous {
      Some(value) => guard.insert(key.to_string(), value),
      None => guard.remove(key),
    };
  }

  pub(crate) fn snapshot(&self) -> BTreeMap<String, String> {
    self.entries.read().clone()
  }

  pub fn len(&self) -> usize {
    self.entries.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.read().is_empty()
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(self.entries.read().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    let mut guard = self.entries.write();
    if let Some(capacity) = self.capacity {
      let used: usize = guard.iter().map(|(k, v)| entry_size(k, v)).sum();
      let replaced = guard.get(key).map_or(0, |old| entry_size(key, old));
      let requested = entry_size(key, value);
      if used - replaced + requested > capacity {
        return Err(StorageError::QuotaExceeded {
          key: key.to_string(),
          requested,
        });
      }
    }
    guard.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn delete(&self, key: &str) -> Result<(), StorageError> {
    self.entries.write().remove(key);
    Ok(())
  }

  fn keys(&self) -> Result<Vec<String>, StorageError> {
    Ok(self.entries.read().keys().cloned().collect())
  }

  fn used_bytes(&self) -> Result<usize, StorageError> {
    Ok(self.entries.read().iter().map(|(k, v)| entry_size(k, v)).sum())
  }
}
