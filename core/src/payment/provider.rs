// vitrine/src/payment/provider.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixPaymentRequest {
  pub order_id: String,
  pub amount_cents: i64,
  pub payer_email: String,
  #[serde(default)]
  pub description: Option<String>,
}

/// Everything the checkout needs to show a PIX QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixPayment {
  pub provider_payment_id: String,
  /// Copy-and-paste PIX payload.
  pub qr_code: String,
  pub qr_code_base64: String,
  pub expires_at: DateTime<Utc>,
}

/// Card form fields after tokenization. No raw card numbers reach this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPaymentForm {
  pub token: String,
  pub payment_method_id: String,
  pub installments: u32,
  pub payer_email: String,
  #[serde(default)]
  pub issuer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPaymentRequest {
  pub order_id: String,
  pub amount_cents: i64,
  pub form: CardPaymentForm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPaymentReceipt {
  pub provider_payment_id: String,
  /// Raw provider status, e.g. `approved` or `in_process`.
  pub status: String,
  #[serde(default)]
  pub status_detail: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("Payment declined by provider: {0}")]
  Declined(String),

  #[error("Invalid payment request: {0}")]
  InvalidRequest(String),

  #[error("Payment provider unavailable: {0}")]
  Unavailable(String),
}

/// The payment provider SDK, as seen by the checkout.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
  fn name(&self) -> &str;

  async fn create_pix_payment(&self, request: &PixPaymentRequest) -> Result<PixPayment, ProviderError>;

  async fn submit_card_payment(&self, request: &CardPaymentRequest) -> Result<CardPaymentReceipt, ProviderError>;
}
