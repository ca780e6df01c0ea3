// vitrine_storefront/src/web/handlers/watch_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use vitrine::{CheckoutOutcome, PaymentWatcher, WatchCallbacks, WatchStatus};

use crate::errors::AppError;
use crate::state::{AppState, WatchRegistry};

/// How long a settled watch stays readable through the status route.
const SETTLED_WATCH_RETENTION: Duration = Duration::from_secs(10 * 60);

/// A watch worth handing back to a new request: one still polling or one that
/// already saw the payment approved. Anything else gets replaced.
fn is_reusable(watcher: &PaymentWatcher) -> bool {
  watcher.snapshot().is_polling || watcher.status() == WatchStatus::Success
}

/// Drops `watcher` from the registry unless a newer watch took its slot.
async fn retire(watches: &WatchRegistry, order_id: &str, watcher: &Arc<PaymentWatcher>) -> bool {
  let mut watches = watches.lock().await;
  match watches.get(order_id) {
    Some(current) if Arc::ptr_eq(current, watcher) => {
      watches.remove(order_id);
      true
    }
    _ => false,
  }
}

/// Returns the running or approved watch for `order_id`, starting a new one
/// otherwise. Settled watches leave the registry after a retention period.
pub(crate) async fn ensure_watch(app_state: &AppState, order_id: &str) -> Arc<PaymentWatcher> {
  let mut watches = app_state.watches.lock().await;
  if let Some(existing) = watches.get(order_id) {
    if is_reusable(existing) {
      return existing.clone();
    }
    debug!(%order_id, status = ?existing.status(), "Replacing finished payment watch.");
  }

  let failed_id = order_id.to_string();
  let timed_out_id = order_id.to_string();
  let callbacks = WatchCallbacks::new()
    .on_failure(move |order| warn!(order_id = %failed_id, status = ?order.status, "Payment was not approved."))
    .on_timeout(move || warn!(order_id = %timed_out_id, "Gave up waiting for payment confirmation."));
  let watcher = Arc::new(app_state.checkout.watch(order_id, callbacks));
  if let Some(previous) = watches.insert(order_id.to_string(), watcher.clone()) {
    previous.stop_polling();
  }

  let checkout = app_state.checkout.clone();
  let registry = app_state.watches.clone();
  let settling = watcher.clone();
  let order_id = order_id.to_string();
  tokio::spawn(async move {
    match checkout.settle(&settling).await {
      Some(CheckoutOutcome::Paid(order)) => info!(order_id = %order.id, "Order paid, guest cart cleared."),
      Some(outcome) => debug!(?outcome, "Checkout finished without payment."),
      None => debug!("Watch ended before settling."),
    }
    tokio::time::sleep(SETTLED_WATCH_RETENTION).await;
    if retire(&registry, &order_id, &settling).await {
      debug!(%order_id, "Retired settled payment watch.");
    }
  });
  watcher
}

#[instrument(name = "handler::start_watch", skip(app_state), fields(order_id = %order_id))]
pub async fn start_watch_handler(
  app_state: web::Data<AppState>,
  order_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order_id = order_id.into_inner();
  if order_id.trim().is_empty() {
    return Err(AppError::Validation("Order id must not be empty.".to_string()));
  }
  let watcher = ensure_watch(&app_state, &order_id).await;
  Ok(HttpResponse::Accepted().json(json!({
      "watch": watcher.snapshot(),
      "pollIntervalMs": app_state.config.poll_interval.as_millis() as u64,
  })))
}

#[instrument(name = "handler::watch_status", skip(app_state), fields(order_id = %order_id))]
pub async fn watch_status_handler(
  app_state: web::Data<AppState>,
  order_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order_id = order_id.into_inner();
  let watches = app_state.watches.lock().await;
  let watcher = watches
    .get(&order_id)
    .ok_or_else(|| AppError::NotFound(format!("No payment watch for order '{}'.", order_id)))?;
  Ok(HttpResponse::Ok().json(watcher.snapshot()))
}

#[instrument(name = "handler::stop_watch", skip(app_state), fields(order_id = %order_id))]
pub async fn stop_watch_handler(
  app_state: web::Data<AppState>,
  order_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order_id = order_id.into_inner();
  let watcher = app_state
    .watches
    .lock()
    .await
    .remove(&order_id)
    .ok_or_else(|| AppError::NotFound(format!("No payment watch for order '{}'.", order_id)))?;
  watcher.stop_polling();
  Ok(HttpResponse::Ok().json(watcher.snapshot()))
}
