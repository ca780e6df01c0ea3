// vitrine/src/clock.rs

//! Wall-clock abstraction used by the TTL logic of the stores.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    ManualClock(Arc::new(Mutex::new(start)))
  }

  pub fn advance(&self, by: Duration) {
    let mut guard = self.0.lock();
    *guard += by;
  }

  pub fn set(&self, to: DateTime<Utc>) {
    *self.0.lock() = to;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    *self.0.lock()
  }
}

pub type SharedClock = Arc<dyn Clock>;
