// vitrine/src/drafts/store.rs

use crate::clock::SharedClock;
use crate::config::DraftConfig;
use crate::drafts::compact::{compactify_customization, expand_customization};
use crate::error::StorageError;
use crate::storage::{entry_size, SharedStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

pub const DRAFT_KEY_PREFIX: &str = "customization:";

fn draft_key(product_id: &str) -> String {
  format!("{DRAFT_KEY_PREFIX}{product_id}")
}

/// On-disk shape of a draft. Timestamps are epoch milliseconds.
#[derive(Debug, Serialize, Deserialize)]
struct StoredDraft {
  data: Map<String, Value>,
  ts: i64,
  exp: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomizationDraft {
  pub product_id: String,
  /// Expanded customization fields.
  pub data: Map<String, Value>,
  pub saved_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftInfo {
  pub product_id: String,
  pub timestamp: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
  pub size_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageQuota {
  pub used: usize,
  pub limit: usize,
  pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftSaveOutcome {
  Saved { bytes: usize, evicted: Vec<String> },
  /// The backend refused the write even after eviction.
  QuotaExceeded { requested: usize, used: usize, limit: usize },
}

impl DraftSaveOutcome {
  pub fn is_saved(&self) -> bool {
    matches!(self, DraftSaveOutcome::Saved { .. })
  }
}

#[derive(Clone)]
pub struct DraftStore {
  store: SharedStore,
  clock: SharedClock,
  config: DraftConfig,
}

impl DraftStore {
  pub fn new(store: SharedStore, clock: SharedClock, config: DraftConfig) -> Self {
    Self { store, clock, config }
  }

  pub fn config(&self) -> &DraftConfig {
    &self.config
  }

  /// Compacts and writes the draft for `product_id`, evicting older drafts
  /// first when the write would push usage past the eviction threshold.
  ///
  /// Quota exhaustion is reported as `DraftSaveOutcome::QuotaExceeded`; any
  /// other storage failure is returned as an error.
  #[instrument(name = "DraftStore::save", skip(self, data), fields(fields = data.len()), err(Display))]
  pub fn save(&self, product_id: &str, data: &Map<String, Value>) -> Result<DraftSaveOutcome, StorageError> {
    let key = draft_key(product_id);
    let now = self.clock.now();
    let record = StoredDraft {
      data: compactify_customization(data),
      ts: now.timestamp_millis(),
      exp: (now + self.config.ttl).timestamp_millis(),
    };
    let body = serde_json::to_string(&record).map_err(|e| StorageError::Backend(e.to_string()))?;
    let requested = entry_size(&key, &body);

    // Usage is read right before the write so eviction never works off a stale figure.
    let used = self.store.used_bytes()?;
    let replaced = self.store.get(&key)?.map_or(0, |old| entry_size(&key, &old));
    let projected = used.saturating_sub(replaced) + requested;

    let mut evicted = Vec::new();
    if projected > self.config.eviction_threshold() {
      info!(
        projected,
        threshold = self.config.eviction_threshold(),
        "Draft storage near quota, evicting older drafts."
      );
      evicted = self.evict_keeping(self.config.retain.saturating_sub(1), Some(product_id))?;
    }

    match self.store.set(&key, &body) {
      Ok(()) => {
        debug!(bytes = requested, evicted = evicted.len(), "Draft saved.");
        Ok(DraftSaveOutcome::Saved {
          bytes: requested,
          evicted,
        })
      }
      Err(e) if e.is_quota_exceeded() => {
        let used = self.store.used_bytes().unwrap_or(used);
        warn!(requested, used, limit = self.config.quota_bytes, "Draft rejected: storage quota exceeded.");
        Ok(DraftSaveOutcome::QuotaExceeded {
          requested,
          used,
          limit: self.config.quota_bytes,
        })
      }
      Err(e) => Err(e),
    }
  }

  /// Returns the expanded draft, or `None` when it is absent, expired or
  /// unreadable. Expired and corrupt entries are removed.
  pub fn load(&self, product_id: &str) -> Option<CustomizationDraft> {
    let key = draft_key(product_id);
    let raw = match self.store.get(&key) {
      Ok(Some(raw)) => raw,
      Ok(None) => return None,
      Err(e) => {
        warn!(%product_id, error = %e, "Failed to read draft.");
        return None;
      }
    };

    let record = match self.parse_or_purge(&key, &raw) {
      Some(record) => record,
      None => return None,
    };
    let (saved_at, expires_at) = match (millis_to_utc(record.ts), millis_to_utc(record.exp)) {
      (Some(saved_at), Some(expires_at)) => (saved_at, expires_at),
      _ => {
        self.purge(&key, "timestamps out of range");
        return None;
      }
    };
    if self.clock.now() > expires_at {
      self.purge(&key, "expired");
      return None;
    }

    Some(CustomizationDraft {
      product_id: product_id.to_string(),
      data: expand_customization(&record.data),
      saved_at,
      expires_at,
    })
  }

  pub fn remove(&self, product_id: &str) -> Result<(), StorageError> {
    self.store.delete(&draft_key(product_id))
  }

  /// Lists every readable draft. Corrupt entries are purged along the way.
  pub fn list_all_drafts(&self) -> Vec<DraftInfo> {
    match self.try_list() {
      Ok(drafts) => drafts,
      Err(e) => {
        warn!(error = %e, "Failed to enumerate drafts.");
        Vec::new()
      }
    }
  }

  pub fn get_storage_quota(&self) -> StorageQuota {
    let used = self.store.used_bytes().unwrap_or_else(|e| {
      warn!(error = %e, "Failed to measure storage usage.");
      0
    });
    let limit = self.config.quota_bytes;
    let percentage = if limit == 0 {
      100.0
    } else {
      used as f64 / limit as f64 * 100.0
    };
    StorageQuota { used, limit, percentage }
  }

  /// Deletes every expired draft and returns the affected product ids.
  pub fn purge_expired(&self) -> Result<Vec<String>, StorageError> {
    let now = self.clock.now();
    let mut purged = Vec::new();
    for info in self.try_list()? {
      if now > info.expires_at {
        self.store.delete(&draft_key(&info.product_id))?;
        purged.push(info.product_id);
      }
    }
    if !purged.is_empty() {
      debug!(count = purged.len(), "Purged expired drafts.");
    }
    Ok(purged)
  }

  /// Keeps the `retain` most recently saved drafts and deletes the rest.
  pub fn evict_to(&self, retain: usize) -> Result<Vec<String>, StorageError> {
    self.evict_keeping(retain, None)
  }

  fn evict_keeping(&self, keep: usize, exclude: Option<&str>) -> Result<Vec<String>, StorageError> {
    let mut drafts: Vec<DraftInfo> = self
      .try_list()?
      .into_iter()
      .filter(|d| Some(d.product_id.as_str()) != exclude)
      .collect();
    drafts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut evicted = Vec::new();
    for stale in drafts.into_iter().skip(keep) {
      self.store.delete(&draft_key(&stale.product_id))?;
      evicted.push(stale.product_id);
    }
    if !evicted.is_empty() {
      info!(count = evicted.len(), kept = keep, "Evicted drafts.");
    }
    Ok(evicted)
  }

  fn try_list(&self) -> Result<Vec<DraftInfo>, StorageError> {
    let mut drafts = Vec::new();
    for key in self.store.keys()? {
      let Some(product_id) = key.strip_prefix(DRAFT_KEY_PREFIX) else {
        continue;
      };
      let Some(raw) = self.store.get(&key)? else {
        continue;
      };
      let Some(record) = self.parse_or_purge(&key, &raw) else {
        continue;
      };
      if let (Some(timestamp), Some(expires_at)) = (millis_to_utc(record.ts), millis_to_utc(record.exp)) {
        drafts.push(DraftInfo {
          product_id: product_id.to_string(),
          timestamp,
          expires_at,
          size_bytes: entry_size(&key, &raw),
        });
      } else {
        self.purge(&key, "timestamps out of range");
      }
    }
    Ok(drafts)
  }

  fn parse_or_purge(&self, key: &str, raw: &str) -> Option<StoredDraft> {
    match serde_json::from_str::<StoredDraft>(raw) {
      Ok(record) => Some(record),
      Err(e) => {
        self.purge(key, &format!("corrupt: {e}"));
        None
      }
    }
  }

  fn purge(&self, key: &str, reason: &str) {
    debug!(%key, %reason, "Purging draft.");
    if let Err(e) = self.store.delete(key) {
      warn!(%key, error = %e, "Failed to purge draft.");
    }
  }
}

fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
  DateTime::from_timestamp_millis(ms)
}
