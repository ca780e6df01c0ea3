// vitrine_storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use vitrine::config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL, DEFAULT_STORAGE_QUOTA_BYTES};
use vitrine::ReconcileConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub orders_api_base_url: String,

  pub poll_interval: Duration,
  pub poll_max_attempts: u32,

  pub storage_file: String,
  pub storage_quota_bytes: usize,

  pub mock_payment_account_id: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let orders_api_base_url = get_env("ORDERS_API_BASE_URL")?;

    let poll_interval_ms = match get_env("POLL_INTERVAL_MS") {
      Ok(raw) => raw
        .parse::<u64>()
        .map_err(|e| AppError::Config(format!("Invalid POLL_INTERVAL_MS: {}", e)))?,
      Err(_) => DEFAULT_POLL_INTERVAL.as_millis() as u64,
    };
    let poll_max_attempts = match get_env("POLL_MAX_ATTEMPTS") {
      Ok(raw) => raw
        .parse::<u32>()
        .map_err(|e| AppError::Config(format!("Invalid POLL_MAX_ATTEMPTS: {}", e)))?,
      Err(_) => DEFAULT_MAX_ATTEMPTS,
    };

    let storage_file = get_env("STORAGE_FILE").unwrap_or_else(|_| "vitrine-storage.json".to_string());
    let storage_quota_bytes = match get_env("STORAGE_QUOTA_BYTES") {
      Ok(raw) => raw
        .parse::<usize>()
        .map_err(|e| AppError::Config(format!("Invalid STORAGE_QUOTA_BYTES: {}", e)))?,
      Err(_) => DEFAULT_STORAGE_QUOTA_BYTES,
    };

    let mock_payment_account_id =
      get_env("MOCK_PAYMENT_ACCOUNT_ID").unwrap_or_else(|_| "mock_main_acct".to_string());

    let config = Self {
      server_host,
      server_port,
      orders_api_base_url,
      poll_interval: Duration::from_millis(poll_interval_ms),
      poll_max_attempts,
      storage_file,
      storage_quota_bytes,
      mock_payment_account_id,
    };
    config.reconcile()?;

    tracing::info!("Application configuration loaded successfully.");
    Ok(config)
  }

  /// Polling settings, validated.
  pub fn reconcile(&self) -> Result<ReconcileConfig> {
    Ok(ReconcileConfig::new(self.poll_interval, self.poll_max_attempts)?)
  }
}
