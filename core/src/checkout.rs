// vitrine/src/checkout.rs

//! Ties payment confirmation to the local cart: a confirmed payment empties
//! the guest cart and tells the caller where to navigate.

use crate::api::OrderApi;
use crate::cart::GuestCartStore;
use crate::config::ReconcileConfig;
use crate::models::Order;
use crate::push::PaymentEvents;
use crate::reconcile::{PaymentWatcher, WatchCallbacks, WatchOptions, WatchStatus};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
  Paid(Order),
  Rejected(Order),
  TimedOut,
}

#[derive(Clone)]
pub struct CheckoutFlow {
  api: Arc<dyn OrderApi>,
  cart: GuestCartStore,
  events: PaymentEvents,
  config: ReconcileConfig,
}

impl CheckoutFlow {
  pub fn new(api: Arc<dyn OrderApi>, cart: GuestCartStore, events: PaymentEvents, config: ReconcileConfig) -> Self {
    Self {
      api,
      cart,
      events,
      config,
    }
  }

  /// Starts watching `order_id` and subscribes it to push notifications.
  /// A successful payment clears the guest cart before `callbacks.on_success`
  /// runs.
  pub fn watch(&self, order_id: &str, mut callbacks: WatchCallbacks) -> PaymentWatcher {
    let cart = self.cart.clone();
    let user_on_success = callbacks.on_success.take();
    callbacks.on_success = Some(Box::new(move |order: &Order| {
      cart.clear();
      if let Some(cb) = &user_on_success {
        cb(order);
      }
    }));

    let options = WatchOptions::new(order_id).with_config(self.config);
    let watcher = PaymentWatcher::new(Arc::clone(&self.api), options, callbacks);
    watcher.listen(&self.events);
    watcher
  }

  /// Waits for `watcher` to settle. `None` means the watch was stopped or
  /// reset before reaching an outcome.
  #[instrument(name = "CheckoutFlow::settle", skip_all, fields(order_id = ?watcher.order_id()))]
  pub async fn settle(&self, watcher: &PaymentWatcher) -> Option<CheckoutOutcome> {
    let status = watcher.wait_terminal().await?;
    let order = watcher.snapshot().current_order;
    let outcome = match (status, order) {
      (WatchStatus::Success, Some(order)) => CheckoutOutcome::Paid(order),
      (WatchStatus::Failure, Some(order)) => CheckoutOutcome::Rejected(order),
      _ => CheckoutOutcome::TimedOut,
    };
    info!(outcome = ?outcome_label(&outcome), "Checkout settled.");
    Some(outcome)
  }
}

fn outcome_label(outcome: &CheckoutOutcome) -> &'static str {
  match outcome {
    CheckoutOutcome::Paid(_) => "paid",
    CheckoutOutcome::Rejected(_) => "rejected",
    CheckoutOutcome::TimedOut => "timed_out",
  }
}
