// vitrine/src/reconcile/session.rs

use crate::models::Order;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
  Idle,
  Polling,
  Success,
  Failure,
  Timeout,
}

impl WatchStatus {
  pub fn is_terminal(self) -> bool {
    matches!(self, WatchStatus::Success | WatchStatus::Failure | WatchStatus::Timeout)
  }
}

/// Point-in-time view of a watch, suitable for status pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchSnapshot {
  pub order_id: Option<String>,
  pub status: WatchStatus,
  pub attempts: u32,
  pub max_attempts: u32,
  pub current_order: Option<Order>,
  pub error: Option<String>,
  pub is_polling: bool,
}

/// Published on every session change; `live` is false once the schedule stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Phase {
  pub status: WatchStatus,
  pub live: bool,
}

#[derive(Debug)]
pub(crate) struct Session {
  pub status: WatchStatus,
  pub attempts: u32,
  pub current_order: Option<Order>,
  pub error: Option<String>,
  pub live: bool,
  /// Bumped whenever the session is started, stopped, reset or settled.
  /// In-flight work carrying an older value is discarded.
  pub generation: u64,
}

impl Session {
  pub fn new() -> Self {
    Self {
      status: WatchStatus::Idle,
      attempts: 0,
      current_order: None,
      error: None,
      live: false,
      generation: 0,
    }
  }

  pub fn accepts(&self, generation: u64) -> bool {
    self.live && self.generation == generation && self.status == WatchStatus::Polling
  }

  pub fn phase(&self) -> Phase {
    Phase {
      status: self.status,
      live: self.live,
    }
  }
}
