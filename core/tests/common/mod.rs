// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::time::Duration;
use tracing::Level;
use vitrine::{
  CartItem, ManualClock, Order, OrderApi, OrderStatus, PaymentInfo, PaymentStatus, ReconcileConfig, SharedClock,
  VitrineError, VitrineResult,
};

// --- Scripted order API ---

/// One canned response of `ScriptedOrderApi`.
#[derive(Clone, Debug)]
pub enum Reply {
  Order(OrderStatus, Option<PaymentStatus>),
  Fail(&'static str),
}

impl Reply {
  pub fn pending() -> Self {
    Reply::Order(OrderStatus::Pending, Some(PaymentStatus::Pending))
  }

  pub fn approved() -> Self {
    Reply::Order(OrderStatus::Pending, Some(PaymentStatus::Approved))
  }

  pub fn rejected() -> Self {
    Reply::Order(OrderStatus::Pending, Some(PaymentStatus::Rejected))
  }
}

/// Answers `fetch_order` from a queue of replies, then repeats `fallback`.
pub struct ScriptedOrderApi {
  replies: Mutex<VecDeque<Reply>>,
  fallback: Reply,
  delay: Duration,
  calls: AtomicUsize,
}

impl ScriptedOrderApi {
  pub fn new(replies: Vec<Reply>, fallback: Reply) -> Arc<Self> {
    Self::with_delay(replies, fallback, Duration::ZERO)
  }

  pub fn always(reply: Reply) -> Arc<Self> {
    Self::new(Vec::new(), reply)
  }

  pub fn with_delay(replies: Vec<Reply>, fallback: Reply, delay: Duration) -> Arc<Self> {
    Arc::new(Self {
      replies: Mutex::new(replies.into()),
      fallback,
      delay,
      calls: AtomicUsize::new(0),
    })
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl OrderApi for ScriptedOrderApi {
  async fn fetch_order(&self, order_id: &str) -> VitrineResult<Order> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let reply = self.replies.lock().pop_front().unwrap_or_else(|| self.fallback.clone());
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    match reply {
      Reply::Order(status, payment) => Ok(make_order(order_id, status, payment)),
      Reply::Fail(message) => Err(VitrineError::Api {
        order_id: order_id.to_string(),
        message: message.to_string(),
      }),
    }
  }
}

// --- Builders ---

pub fn make_order(id: &str, status: OrderStatus, payment: Option<PaymentStatus>) -> Order {
  Order {
    id: id.to_string(),
    status,
    total_cents: 12_990,
    payment: payment.map(|status| PaymentInfo {
      status,
      provider_id: Some(format!("pay-{id}")),
      updated_at: None,
    }),
  }
}

pub fn fast_config(max_attempts: u32) -> ReconcileConfig {
  ReconcileConfig {
    interval: Duration::from_millis(10),
    max_attempts,
  }
}

pub fn start_instant() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn manual_clock() -> (ManualClock, SharedClock) {
  let clock = ManualClock::new(start_instant());
  let shared: SharedClock = Arc::new(clock.clone());
  (clock, shared)
}

pub fn cart_items(ids: &[&str]) -> Vec<CartItem> {
  ids.iter().map(|id| CartItem::new(*id, 1)).collect()
}

// --- Counters for callbacks ---

#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn hit(&self) {
    self.0.fetch_add(1, Ordering::SeqCst);
  }

  pub fn get(&self) -> usize {
    self.0.load(Ordering::SeqCst)
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
