// vitrine/src/reconcile/watcher.rs

use super::classify::{classify, Verdict};
use super::session::{Phase, Session, WatchSnapshot, WatchStatus};
use crate::api::OrderApi;
use crate::config::ReconcileConfig;
use crate::error::VitrineResult;
use crate::models::Order;
use crate::push::PaymentEvents;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, event, info, warn, Level};

pub type OrderCallback = Box<dyn Fn(&Order) + Send + Sync>;
pub type TimeoutCallback = Box<dyn Fn() + Send + Sync>;

/// Terminal callbacks of a watch. At most one of them fires per session.
#[derive(Default)]
pub struct WatchCallbacks {
  pub(crate) on_success: Option<OrderCallback>,
  pub(crate) on_failure: Option<OrderCallback>,
  pub(crate) on_timeout: Option<TimeoutCallback>,
}

impl WatchCallbacks {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn on_success<F>(mut self, f: F) -> Self
  where
    F: Fn(&Order) + Send + Sync + 'static,
  {
    self.on_success = Some(Box::new(f));
    self
  }

  pub fn on_failure<F>(mut self, f: F) -> Self
  where
    F: Fn(&Order) + Send + Sync + 'static,
  {
    self.on_failure = Some(Box::new(f));
    self
  }

  pub fn on_timeout<F>(mut self, f: F) -> Self
  where
    F: Fn() + Send + Sync + 'static,
  {
    self.on_timeout = Some(Box::new(f));
    self
  }
}

#[derive(Debug, Clone)]
pub struct WatchOptions {
  pub order_id: Option<String>,
  /// Start polling as soon as the watcher is built.
  pub enabled: bool,
  pub config: ReconcileConfig,
}

impl WatchOptions {
  pub fn new(order_id: impl Into<String>) -> Self {
    Self {
      order_id: Some(order_id.into()),
      enabled: true,
      config: ReconcileConfig::default(),
    }
  }

  pub fn with_config(mut self, config: ReconcileConfig) -> Self {
    self.config = config;
    self
  }

  pub fn disabled(mut self) -> Self {
    self.enabled = false;
    self
  }
}

enum Terminal {
  Success(Order),
  Failure(Order),
  Timeout,
}

impl Terminal {
  fn status(&self) -> WatchStatus {
    match self {
      Terminal::Success(_) => WatchStatus::Success,
      Terminal::Failure(_) => WatchStatus::Failure,
      Terminal::Timeout => WatchStatus::Timeout,
    }
  }
}

/// Handle on the running schedule of one session.
struct Timer {
  generation: u64,
  stop: watch::Sender<bool>,
  nudge: Arc<Notify>,
}

impl Timer {
  fn cancel(self) {
    let _ = self.stop.send(true);
  }
}

struct Shared {
  order_id: Option<String>,
  config: ReconcileConfig,
  api: Arc<dyn OrderApi>,
  callbacks: WatchCallbacks,
  session: Mutex<Session>,
  timer: Mutex<Option<Timer>>,
  phase: watch::Sender<Phase>,
}

/// Polls an order until its payment settles, the attempt budget runs out, or
/// the watch is stopped. Dropping the watcher stops it.
pub struct PaymentWatcher {
  shared: Arc<Shared>,
  listener: Mutex<Option<JoinHandle<()>>>,
}

impl PaymentWatcher {
  /// Builds the watcher and, when `options.enabled` is set and an order id is
  /// present, starts polling immediately. Auto-start needs a tokio runtime.
  pub fn new(api: Arc<dyn OrderApi>, options: WatchOptions, callbacks: WatchCallbacks) -> Self {
    let session = Session::new();
    let (phase, _) = watch::channel(session.phase());
    let watcher = Self {
      shared: Arc::new(Shared {
        order_id: options.order_id,
        config: options.config,
        api,
        callbacks,
        session: Mutex::new(session),
        timer: Mutex::new(None),
        phase,
      }),
      listener: Mutex::new(None),
    };
    if options.enabled && watcher.shared.order_id.is_some() {
      watcher.start_polling();
    }
    watcher
  }

  pub fn order_id(&self) -> Option<&str> {
    self.shared.order_id.as_deref()
  }

  /// Starts a session: attempts go back to zero, one check runs right away and
  /// then one per interval. Returns whether a session was started.
  ///
  /// Does nothing while already polling, without an order id, with an invalid
  /// config, or once the session reached a terminal state (call `reset` first).
  pub fn start_polling(&self) -> bool {
    let shared = &self.shared;
    let Some(order_id) = shared.order_id.as_deref() else {
      debug!("No order id, not polling.");
      return false;
    };
    let runtime = match tokio::runtime::Handle::try_current() {
      Ok(runtime) => runtime,
      Err(e) => {
        error!(%order_id, error = %e, "Cannot start polling outside a tokio runtime.");
        return false;
      }
    };
    if let Err(e) = shared.config.validate() {
      error!(%order_id, error = %e, "Refusing to poll with an invalid configuration.");
      shared.session.lock().error = Some(e.to_string());
      return false;
    }

    let (generation, phase) = {
      let mut s = shared.session.lock();
      if s.live {
        return false;
      }
      if s.status.is_terminal() {
        debug!(%order_id, status = ?s.status, "Session already settled, reset before polling again.");
        return false;
      }
      s.generation += 1;
      s.attempts = 0;
      s.status = WatchStatus::Polling;
      s.live = true;
      (s.generation, s.phase())
    };
    shared.phase.send_replace(phase);

    let (stop, stop_rx) = watch::channel(false);
    let nudge = Arc::new(Notify::new());
    let timer = Timer {
      generation,
      stop,
      nudge: Arc::clone(&nudge),
    };
    if let Some(previous) = shared.timer.lock().replace(timer) {
      previous.cancel();
    }
    runtime.spawn(run_timer(Arc::clone(shared), generation, stop_rx, nudge));

    info!(
      %order_id,
      interval_ms = shared.config.interval.as_millis() as u64,
      max_attempts = shared.config.max_attempts,
      "Started payment polling."
    );
    true
  }

  /// Cancels the schedule. Responses still in flight are discarded. Calling
  /// it when nothing is scheduled has no effect.
  pub fn stop_polling(&self) {
    self.shared.cancel_timer(None);
    let phase = {
      let mut s = self.shared.session.lock();
      if !s.live {
        return;
      }
      s.live = false;
      s.generation += 1;
      s.phase()
    };
    self.shared.phase.send_replace(phase);
    debug!(order_id = ?self.shared.order_id, "Stopped payment polling.");
  }

  /// Stops polling and returns the session to `Idle` with no attempts,
  /// order or error recorded.
  pub fn reset(&self) {
    self.shared.cancel_timer(None);
    let phase = {
      let mut s = self.shared.session.lock();
      s.generation += 1;
      s.status = WatchStatus::Idle;
      s.attempts = 0;
      s.current_order = None;
      s.error = None;
      s.live = false;
      s.phase()
    };
    self.shared.phase.send_replace(phase);
  }

  /// Checks the order right away and pushes the next scheduled check a full
  /// interval out. Ignored when not polling.
  pub fn notify_push(&self) {
    self.shared.nudge();
  }

  /// Forwards push notifications for this order from `events` to
  /// `notify_push`. Replaces any previous listener.
  pub fn listen(&self, events: &PaymentEvents) {
    let Some(order_id) = self.shared.order_id.clone() else {
      return;
    };
    let runtime = match tokio::runtime::Handle::try_current() {
      Ok(runtime) => runtime,
      Err(e) => {
        error!(%order_id, error = %e, "Cannot listen for payment events outside a tokio runtime.");
        return;
      }
    };

    let mut rx = events.subscribe();
    let shared = Arc::clone(&self.shared);
    let task = runtime.spawn(async move {
      loop {
        match rx.recv().await {
          Ok(event) if event.order_id == order_id => {
            event!(Level::DEBUG, %order_id, kind = ?event.kind, "Payment event received.");
            shared.nudge();
          }
          Ok(_) => {}
          Err(broadcast::error::RecvError::Lagged(skipped)) => {
            warn!(%order_id, skipped, "Payment event listener lagged, checking order.");
            shared.nudge();
          }
          Err(broadcast::error::RecvError::Closed) => break,
        }
      }
    });
    if let Some(previous) = self.listener.lock().replace(task) {
      previous.abort();
    }
  }

  pub fn snapshot(&self) -> WatchSnapshot {
    let s = self.shared.session.lock();
    WatchSnapshot {
      order_id: self.shared.order_id.clone(),
      status: s.status,
      attempts: s.attempts,
      max_attempts: self.shared.config.max_attempts,
      current_order: s.current_order.clone(),
      error: s.error.clone(),
      is_polling: s.live,
    }
  }

  pub fn status(&self) -> WatchStatus {
    self.shared.session.lock().status
  }

  /// Waits for the current session to settle. Returns `None` if the session
  /// is stopped or reset first, or if nothing is polling.
  pub async fn wait_terminal(&self) -> Option<WatchStatus> {
    let mut rx = self.shared.phase.subscribe();
    let phase = *rx.wait_for(|p| p.status.is_terminal() || !p.live).await.ok()?;
    phase.status.is_terminal().then_some(phase.status)
  }
}

impl Drop for PaymentWatcher {
  fn drop(&mut self) {
    self.stop_polling();
    if let Some(listener) = self.listener.lock().take() {
      listener.abort();
    }
  }
}

impl Shared {
  fn nudge(&self) {
    if let Some(timer) = self.timer.lock().as_ref() {
      timer.nudge.notify_one();
    }
  }

  /// Cancels the running timer; with `Some(generation)` only if it belongs
  /// to that session.
  fn cancel_timer(&self, generation: Option<u64>) {
    let mut slot = self.timer.lock();
    let belongs = match (slot.as_ref(), generation) {
      (Some(timer), Some(generation)) => timer.generation == generation,
      (Some(_), None) => true,
      (None, _) => false,
    };
    if belongs {
      if let Some(timer) = slot.take() {
        timer.cancel();
      }
    }
  }

  /// Counts an attempt and fetches the order in its own task. Returns false
  /// when the session is over or its budget is spent.
  fn spawn_check(self: &Arc<Self>, generation: u64) -> bool {
    let Some(order_id) = self.order_id.clone() else {
      return false;
    };
    let attempt = {
      let mut s = self.session.lock();
      if !s.accepts(generation) || s.attempts >= self.config.max_attempts {
        return false;
      }
      s.attempts += 1;
      s.attempts
    };

    let shared = Arc::clone(self);
    tokio::spawn(async move {
      debug!(%order_id, attempt, "Checking order status.");
      let result = shared.api.fetch_order(&order_id).await;
      shared.settle(generation, attempt, result);
    });
    true
  }

  fn settle(&self, generation: u64, attempt: u32, result: VitrineResult<Order>) {
    let max_attempts = self.config.max_attempts;
    let (terminal, phase) = {
      let mut s = self.session.lock();
      if !s.accepts(generation) {
        debug!(attempt, "Discarding response from an ended session.");
        return;
      }

      let terminal = match result {
        Ok(order) => {
          let verdict = classify(&order);
          s.current_order = Some(order.clone());
          match verdict {
            Verdict::Success => Some(Terminal::Success(order)),
            Verdict::Failure => Some(Terminal::Failure(order)),
            Verdict::Pending if attempt >= max_attempts => Some(Terminal::Timeout),
            Verdict::Pending => None,
          }
        }
        Err(e) => {
          warn!(attempt, error = %e, "Order status check failed.");
          s.error = Some(e.to_string());
          (attempt >= max_attempts).then_some(Terminal::Timeout)
        }
      };

      let Some(terminal) = terminal else {
        return;
      };
      s.status = terminal.status();
      s.live = false;
      s.generation += 1;
      (terminal, s.phase())
    };

    self.cancel_timer(Some(generation));
    info!(order_id = ?self.order_id, attempt, status = ?phase.status, "Payment watch settled.");
    match &terminal {
      Terminal::Success(order) => {
        if let Some(cb) = &self.callbacks.on_success {
          cb(order);
        }
      }
      Terminal::Failure(order) => {
        if let Some(cb) = &self.callbacks.on_failure {
          cb(order);
        }
      }
      Terminal::Timeout => {
        if let Some(cb) = &self.callbacks.on_timeout {
          cb();
        }
      }
    }
    self.phase.send_replace(phase);
  }
}

async fn run_timer(shared: Arc<Shared>, generation: u64, mut stop: watch::Receiver<bool>, nudge: Arc<Notify>) {
  let mut ticker = tokio::time::interval(shared.config.interval);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  loop {
    tokio::select! {
      _ = stop.changed() => break,
      _ = nudge.notified() => {
        ticker.reset();
        if !shared.spawn_check(generation) {
          break;
        }
      }
      _ = ticker.tick() => {
        if !shared.spawn_check(generation) {
          break;
        }
      }
    }
  }
  debug!(generation, "Poll timer finished.");
}
