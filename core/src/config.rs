// vitrine/src/config.rs

//! Tunables for the reconciliation engine and the local stores.

use crate::error::{VitrineError, VitrineResult};
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5_000);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Browser local storage hard limit the draft store budgets against.
pub const DEFAULT_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_EVICTION_RATIO: f64 = 0.8;
pub const DEFAULT_RETAINED_DRAFTS: usize = 5;

pub fn default_ttl() -> chrono::Duration {
  chrono::Duration::hours(24)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileConfig {
  pub interval: Duration,
  pub max_attempts: u32,
}

impl Default for ReconcileConfig {
  fn default() -> Self {
    Self {
      interval: DEFAULT_POLL_INTERVAL,
      max_attempts: DEFAULT_MAX_ATTEMPTS,
    }
  }
}

impl ReconcileConfig {
  pub fn new(interval: Duration, max_attempts: u32) -> VitrineResult<Self> {
    let cfg = Self { interval, max_attempts };
    cfg.validate()?;
    Ok(cfg)
  }

  pub fn validate(&self) -> VitrineResult<()> {
    if self.interval.is_zero() {
      return Err(VitrineError::Config("poll interval must be greater than zero".to_string()));
    }
    if self.max_attempts == 0 {
      return Err(VitrineError::Config("max_attempts must be at least 1".to_string()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Copy)]
pub struct CartConfig {
  pub ttl: chrono::Duration,
}

impl Default for CartConfig {
  fn default() -> Self {
    Self { ttl: default_ttl() }
  }
}

#[derive(Debug, Clone, Copy)]
pub struct DraftConfig {
  pub quota_bytes: usize,
  /// Fraction of `quota_bytes` above which a save triggers eviction.
  pub eviction_ratio: f64,
  /// Drafts left in storage after an eviction, counting the one being written.
  pub retain: usize,
  pub ttl: chrono::Duration,
}

impl Default for DraftConfig {
  fn default() -> Self {
    Self {
      quota_bytes: DEFAULT_STORAGE_QUOTA_BYTES,
      eviction_ratio: DEFAULT_EVICTION_RATIO,
      retain: DEFAULT_RETAINED_DRAFTS,
      ttl: default_ttl(),
    }
  }
}

impl DraftConfig {
  pub fn with_quota_bytes(mut self, quota_bytes: usize) -> Self {
    self.quota_bytes = quota_bytes;
    self
  }

  pub fn eviction_threshold(&self) -> usize {
    (self.quota_bytes as f64 * self.eviction_ratio) as usize
  }
}
