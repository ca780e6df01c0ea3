// tests/reconcile_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use vitrine::{
  OrderStatus, PaymentEvent, PaymentEvents, PaymentStatus, PaymentWatcher, ReconcileConfig, WatchCallbacks,
  WatchOptions, WatchStatus,
};

const ORDER_ID: &str = "ord-1001";

struct Tally {
  success: Counter,
  failure: Counter,
  timeout: Counter,
}

impl Tally {
  fn new() -> Self {
    Self {
      success: Counter::new(),
      failure: Counter::new(),
      timeout: Counter::new(),
    }
  }

  fn callbacks(&self) -> WatchCallbacks {
    let (s, f, t) = (self.success.clone(), self.failure.clone(), self.timeout.clone());
    WatchCallbacks::new()
      .on_success(move |_| s.hit())
      .on_failure(move |_| f.hit())
      .on_timeout(move || t.hit())
  }

  fn total(&self) -> usize {
    self.success.get() + self.failure.get() + self.timeout.get()
  }
}

async fn settle(watcher: &PaymentWatcher) -> Option<WatchStatus> {
  tokio::time::timeout(Duration::from_secs(3), watcher.wait_terminal())
    .await
    .expect("watch did not settle in time")
}

#[tokio::test]
#[serial]
async fn test_success_fires_exactly_once_with_overlapping_responses() {
  setup_tracing();
  // Responses take longer than the interval, so several checks are in flight
  // when the first approval lands.
  let api = ScriptedOrderApi::with_delay(Vec::new(), Reply::approved(), Duration::from_millis(35));
  let tally = Tally::new();
  let watcher = PaymentWatcher::new(
    api.clone(),
    WatchOptions::new(ORDER_ID).with_config(fast_config(20)),
    tally.callbacks(),
  );

  assert_eq!(settle(&watcher).await, Some(WatchStatus::Success));
  tokio::time::sleep(Duration::from_millis(100)).await;

  assert!(api.calls() > 1, "expected overlapping checks, got {}", api.calls());
  assert_eq!(tally.success.get(), 1);
  assert_eq!(tally.total(), 1);
  let snap = watcher.snapshot();
  assert_eq!(snap.status, WatchStatus::Success);
  assert!(!snap.is_polling);
}

#[tokio::test]
#[serial]
async fn test_timeout_after_exactly_max_attempts() {
  setup_tracing();
  let api = ScriptedOrderApi::always(Reply::pending());
  let tally = Tally::new();
  let watcher = PaymentWatcher::new(
    api.clone(),
    WatchOptions::new(ORDER_ID).with_config(fast_config(3)),
    tally.callbacks(),
  );

  assert_eq!(settle(&watcher).await, Some(WatchStatus::Timeout));
  tokio::time::sleep(Duration::from_millis(60)).await;

  assert_eq!(api.calls(), 3);
  assert_eq!(tally.timeout.get(), 1);
  assert_eq!(tally.total(), 1);
  let snap = watcher.snapshot();
  assert_eq!(snap.attempts, 3);
  assert_eq!(snap.max_attempts, 3);
  assert_eq!(snap.current_order.map(|o| o.status), Some(OrderStatus::Pending));
}

#[tokio::test]
#[serial]
async fn test_success_on_final_attempt_beats_timeout() {
  setup_tracing();
  let api = ScriptedOrderApi::new(vec![Reply::pending(), Reply::pending()], Reply::approved());
  let tally = Tally::new();
  let watcher = PaymentWatcher::new(
    api.clone(),
    WatchOptions::new(ORDER_ID).with_config(fast_config(3)),
    tally.callbacks(),
  );

  assert_eq!(settle(&watcher).await, Some(WatchStatus::Success));
  assert_eq!(api.calls(), 3);
  assert_eq!(tally.success.get(), 1);
  assert_eq!(tally.timeout.get(), 0);
}

#[tokio::test]
#[serial]
async fn test_rejected_payment_reports_failure_with_order() {
  setup_tracing();
  let api = ScriptedOrderApi::new(vec![Reply::pending()], Reply::rejected());
  let seen = Arc::new(parking_lot::Mutex::new(None));
  let sink = seen.clone();
  let watcher = PaymentWatcher::new(
    api,
    WatchOptions::new(ORDER_ID).with_config(fast_config(10)),
    WatchCallbacks::new().on_failure(move |order| *sink.lock() = Some(order.clone())),
  );

  assert_eq!(settle(&watcher).await, Some(WatchStatus::Failure));
  let order = seen.lock().clone().expect("failure callback should receive the order");
  assert_eq!(order.id, ORDER_ID);
  assert_eq!(order.payment_status(), Some(PaymentStatus::Rejected));
}

#[tokio::test]
#[serial]
async fn test_paid_order_status_alone_is_success() {
  setup_tracing();
  let api = ScriptedOrderApi::always(Reply::Order(OrderStatus::Paid, None));
  let tally = Tally::new();
  let watcher = PaymentWatcher::new(
    api,
    WatchOptions::new(ORDER_ID).with_config(fast_config(5)),
    tally.callbacks(),
  );

  assert_eq!(settle(&watcher).await, Some(WatchStatus::Success));
  assert_eq!(tally.success.get(), 1);
}

#[tokio::test]
#[serial]
async fn test_fetch_errors_do_not_end_polling() {
  setup_tracing();
  let api = ScriptedOrderApi::new(vec![Reply::Fail("gateway down"), Reply::Fail("gateway down")], Reply::approved());
  let tally = Tally::new();
  let watcher = PaymentWatcher::new(
    api.clone(),
    WatchOptions::new(ORDER_ID).with_config(fast_config(5)),
    tally.callbacks(),
  );

  assert_eq!(settle(&watcher).await, Some(WatchStatus::Success));
  assert_eq!(api.calls(), 3);
  let snap = watcher.snapshot();
  assert!(snap.error.unwrap_or_default().contains("gateway down"));
  assert_eq!(tally.success.get(), 1);
}

#[tokio::test]
#[serial]
async fn test_errors_until_budget_exhausted_time_out() {
  setup_tracing();
  let api = ScriptedOrderApi::always(Reply::Fail("connection reset"));
  let tally = Tally::new();
  let watcher = PaymentWatcher::new(
    api.clone(),
    WatchOptions::new(ORDER_ID).with_config(fast_config(2)),
    tally.callbacks(),
  );

  assert_eq!(settle(&watcher).await, Some(WatchStatus::Timeout));
  assert_eq!(api.calls(), 2);
  assert_eq!(tally.timeout.get(), 1);
  assert!(watcher.snapshot().current_order.is_none());
}

#[tokio::test]
#[serial]
async fn test_stop_discards_in_flight_responses() {
  setup_tracing();
  let api = ScriptedOrderApi::with_delay(Vec::new(), Reply::approved(), Duration::from_millis(50));
  let tally = Tally::new();
  let watcher = PaymentWatcher::new(
    api.clone(),
    WatchOptions::new(ORDER_ID).with_config(fast_config(10)),
    tally.callbacks(),
  );

  // Let the immediate check go out, then cancel before it resolves.
  tokio::time::sleep(Duration::from_millis(5)).await;
  watcher.stop_polling();
  watcher.stop_polling();
  assert_eq!(watcher.wait_terminal().await, None);

  tokio::time::sleep(Duration::from_millis(120)).await;
  assert!(api.calls() >= 1);
  assert_eq!(tally.total(), 0);
  let snap = watcher.snapshot();
  assert!(!snap.is_polling);
  assert!(snap.current_order.is_none());
  assert_ne!(snap.status, WatchStatus::Success);
}

#[tokio::test]
#[serial]
async fn test_reset_discards_in_flight_responses_and_clears_state() {
  setup_tracing();
  let api = ScriptedOrderApi::with_delay(vec![Reply::Fail("flaky")], Reply::approved(), Duration::from_millis(30));
  let tally = Tally::new();
  let watcher = PaymentWatcher::new(
    api,
    WatchOptions::new(ORDER_ID).with_config(ReconcileConfig {
      interval: Duration::from_millis(20),
      max_attempts: 10,
    }),
    tally.callbacks(),
  );

  tokio::time::sleep(Duration::from_millis(40)).await;
  watcher.reset();
  tokio::time::sleep(Duration::from_millis(100)).await;

  let snap = watcher.snapshot();
  assert_eq!(snap.status, WatchStatus::Idle);
  assert_eq!(snap.attempts, 0);
  assert!(snap.error.is_none());
  assert!(snap.current_order.is_none());
  assert_eq!(tally.total(), 0);
}

#[tokio::test]
#[serial]
async fn test_push_notification_triggers_immediate_check() {
  setup_tracing();
  let api = ScriptedOrderApi::new(vec![Reply::pending()], Reply::approved());
  let events = PaymentEvents::default();
  let tally = Tally::new();
  // An interval long enough that only the push can produce the second check.
  let watcher = PaymentWatcher::new(
    api.clone(),
    WatchOptions::new(ORDER_ID).with_config(ReconcileConfig {
      interval: Duration::from_secs(30),
      max_attempts: 5,
    }),
    tally.callbacks(),
  );
  watcher.listen(&events);

  tokio::time::sleep(Duration::from_millis(30)).await;
  assert_eq!(api.calls(), 1);
  assert_eq!(watcher.status(), WatchStatus::Polling);

  events.publish(PaymentEvent::approved("some-other-order"));
  tokio::time::sleep(Duration::from_millis(20)).await;
  assert_eq!(api.calls(), 1);

  events.publish(PaymentEvent::approved(ORDER_ID));
  assert_eq!(settle(&watcher).await, Some(WatchStatus::Success));
  assert_eq!(api.calls(), 2);
  assert_eq!(tally.success.get(), 1);
}

#[tokio::test]
#[serial]
async fn test_disabled_watch_waits_for_explicit_start() {
  setup_tracing();
  let api = ScriptedOrderApi::always(Reply::approved());
  let watcher = PaymentWatcher::new(
    api.clone(),
    WatchOptions::new(ORDER_ID).with_config(fast_config(3)).disabled(),
    WatchCallbacks::new(),
  );

  tokio::time::sleep(Duration::from_millis(30)).await;
  assert_eq!(api.calls(), 0);
  assert_eq!(watcher.status(), WatchStatus::Idle);

  assert!(watcher.start_polling());
  assert!(!watcher.start_polling(), "second start while polling is a no-op");
  assert_eq!(settle(&watcher).await, Some(WatchStatus::Success));
}

#[tokio::test]
#[serial]
async fn test_missing_order_id_never_polls() {
  setup_tracing();
  let api = ScriptedOrderApi::always(Reply::approved());
  let watcher = PaymentWatcher::new(
    api.clone(),
    WatchOptions {
      order_id: None,
      enabled: true,
      config: fast_config(3),
    },
    WatchCallbacks::new(),
  );

  assert!(!watcher.start_polling());
  tokio::time::sleep(Duration::from_millis(30)).await;
  assert_eq!(api.calls(), 0);
  assert_eq!(watcher.status(), WatchStatus::Idle);
}

#[tokio::test]
#[serial]
async fn test_restart_after_terminal_requires_reset() {
  setup_tracing();
  let api = ScriptedOrderApi::new(vec![Reply::pending()], Reply::rejected());
  let tally = Tally::new();
  let watcher = PaymentWatcher::new(
    api.clone(),
    WatchOptions::new(ORDER_ID).with_config(fast_config(1)),
    tally.callbacks(),
  );

  assert_eq!(settle(&watcher).await, Some(WatchStatus::Timeout));
  assert!(!watcher.start_polling());

  watcher.reset();
  assert!(watcher.start_polling());
  assert_eq!(settle(&watcher).await, Some(WatchStatus::Failure));
  assert_eq!(tally.timeout.get(), 1);
  assert_eq!(tally.failure.get(), 1);
}

#[tokio::test]
#[serial]
async fn test_dropping_watcher_stops_polling() {
  setup_tracing();
  let api = ScriptedOrderApi::always(Reply::pending());
  let watcher = PaymentWatcher::new(
    api.clone(),
    WatchOptions::new(ORDER_ID).with_config(fast_config(100)),
    WatchCallbacks::new(),
  );

  tokio::time::sleep(Duration::from_millis(35)).await;
  drop(watcher);
  tokio::time::sleep(Duration::from_millis(20)).await;
  let calls_after_drop = api.calls();
  tokio::time::sleep(Duration::from_millis(60)).await;
  assert_eq!(api.calls(), calls_after_drop);
}

#[tokio::test]
#[serial]
async fn test_invalid_config_never_starts_polling() {
  setup_tracing();
  let bad_configs = [
    ReconcileConfig {
      interval: Duration::from_millis(10),
      max_attempts: 0,
    },
    ReconcileConfig {
      interval: Duration::ZERO,
      max_attempts: 3,
    },
  ];

  for config in bad_configs {
    let api = ScriptedOrderApi::always(Reply::pending());
    let tally = Tally::new();
    let watcher = PaymentWatcher::new(
      api.clone(),
      WatchOptions::new(ORDER_ID).with_config(config),
      tally.callbacks(),
    );

    assert!(!watcher.start_polling());
    let snap = watcher.snapshot();
    assert_eq!(snap.status, WatchStatus::Idle);
    assert!(!snap.is_polling);
    assert!(snap.error.is_some());
    assert_eq!(watcher.wait_terminal().await, None);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(api.calls(), 0);
    assert_eq!(tally.total(), 0);
  }
}
