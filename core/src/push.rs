// vitrine/src/push.rs

//! In-process hub for payment notifications pushed by the provider.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEventKind {
  Approved,
  Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
  pub order_id: String,
  pub kind: PaymentEventKind,
}

impl PaymentEvent {
  pub fn approved(order_id: impl Into<String>) -> Self {
    Self {
      order_id: order_id.into(),
      kind: PaymentEventKind::Approved,
    }
  }

  pub fn updated(order_id: impl Into<String>) -> Self {
    Self {
      order_id: order_id.into(),
      kind: PaymentEventKind::Updated,
    }
  }
}

/// Cloning shares the underlying channel.
#[derive(Clone)]
pub struct PaymentEvents {
  tx: broadcast::Sender<PaymentEvent>,
}

impl Default for PaymentEvents {
  fn default() -> Self {
    Self::new(DEFAULT_CAPACITY)
  }
}

impl PaymentEvents {
  pub fn new(capacity: usize) -> Self {
    let (tx, _) = broadcast::channel(capacity.max(1));
    Self { tx }
  }

  /// Delivers `event` to current subscribers and returns how many there were.
  pub fn publish(&self, event: PaymentEvent) -> usize {
    let order_id = event.order_id.clone();
    let delivered = self.tx.send(event).unwrap_or(0);
    debug!(%order_id, delivered, "Published payment event.");
    delivered
  }

  pub fn subscribe(&self) -> broadcast::Receiver<PaymentEvent> {
    self.tx.subscribe()
  }
}
