// vitrine/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Failures raised by a `KeyValueStore` backend.
#[derive(Debug, Error)]
pub enum StorageError {
  #[error("Storage quota exceeded while writing '{key}' ({requested} bytes requested)")]
  QuotaExceeded { key: String, requested: usize },

  #[error("Storage backend failure: {0}")]
  Backend(String),

  #[error("Storage I/O failure: {source}")]
  Io {
    #[from]
    source: std::io::Error,
  },
}

impl StorageError {
  pub fn is_quota_exceeded(&self) -> bool {
    matches!(self, StorageError::QuotaExceeded { .. })
  }
}

#[derive(Debug, Error)]
pub enum VitrineError {
  #[error("Storage error: {source}")]
  Storage {
    #[from]
    source: StorageError,
  },

  #[error("Order API request failed for order '{order_id}': {message}")]
  Api { order_id: String, message: String },

  #[error("Payment initiation failed: {0}")]
  Payment(String),

  #[error("Serialization error: {source}")]
  Serialization {
    #[from]
    source: serde_json::Error,
  },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Internal vitrine error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for VitrineError {
  fn from(err: AnyhowError) -> Self {
    // Keep the chain readable: "outer: inner: root".
    VitrineError::Internal(format!("{:#}", err))
  }
}

pub type VitrineResult<T, E = VitrineError> = std::result::Result<T, E>;
