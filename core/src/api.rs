// vitrine/src/api.rs

//! Client for the storefront's order REST API.

use crate::error::{VitrineError, VitrineResult};
use crate::models::Order;
use crate::storage::SharedStore;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Storage key holding the bearer token of the signed-in customer.
pub const AUTH_TOKEN_KEY: &str = "vitrine:auth_token";

#[async_trait]
pub trait OrderApi: Send + Sync {
  async fn fetch_order(&self, order_id: &str) -> VitrineResult<Order>;
}

pub struct HttpOrderApi {
  base_url: String,
  http: reqwest::Client,
  token_store: Option<SharedStore>,
}

impl HttpOrderApi {
  pub fn new(base_url: impl Into<String>) -> VitrineResult<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(15))
      .build()
      .map_err(|e| VitrineError::Config(format!("failed to build HTTP client: {e}")))?;
    Ok(Self {
      base_url: base_url.into().trim_end_matches('/').to_string(),
      http,
      token_store: None,
    })
  }

  /// Reads the bearer token from `store` on every request.
  pub fn with_token_store(mut self, store: SharedStore) -> Self {
    self.token_store = Some(store);
    self
  }

  fn bearer_token(&self) -> Option<String> {
    let store = self.token_store.as_ref()?;
    match store.get(AUTH_TOKEN_KEY) {
      Ok(token) => token.filter(|t| !t.is_empty()),
      Err(e) => {
        warn!(error = %e, "Could not read auth token, requesting anonymously.");
        None
      }
    }
  }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
  #[instrument(name = "HttpOrderApi::fetch_order", skip(self), err(Display))]
  async fn fetch_order(&self, order_id: &str) -> VitrineResult<Order> {
    let url = format!("{}/orders/{}", self.base_url, order_id);
    let api_error = |message: String| VitrineError::Api {
      order_id: order_id.to_string(),
      message,
    };

    let mut request = self.http.get(&url);
    if let Some(token) = self.bearer_token() {
      request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|e| api_error(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(api_error(format!("HTTP {status}: {body}")));
    }

    let order = response
      .json::<Order>()
      .await
      .map_err(|e| api_error(format!("invalid order payload: {e}")))?;
    debug!(status = ?order.status, payment = ?order.payment_status(), "Fetched order.");
    Ok(order)
  }
}
