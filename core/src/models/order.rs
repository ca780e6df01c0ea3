// vitrine/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
  Pending,
  Paid,
  Shipped,
  Delivered,
  Canceled,
}

/// Payment status as reported by the provider. Statuses this client does not
/// know about map to `Unknown` and are treated as non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
  Pending,
  InProcess,
  Approved,
  Authorized,
  Rejected,
  Cancelled,
  Refunded,
  ChargedBack,
  #[serde(other)]
  Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
  pub status: PaymentStatus,
  #[serde(default)]
  pub provider_id: Option<String>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

/// Read-only projection of a remote order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: String,
  pub status: OrderStatus,
  #[serde(default)]
  pub total_cents: i64,
  #[serde(default)]
  pub payment: Option<PaymentInfo>,
}

impl Order {
  pub fn payment_status(&self) -> Option<PaymentStatus> {
    self.payment.as_ref().map(|p| p.status)
  }
}
