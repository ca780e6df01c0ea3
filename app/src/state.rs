// vitrine_storefront/src/state.rs
use crate::config::AppConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use vitrine::{
  CheckoutFlow, DraftStore, GuestCartStore, OrderApi, PaymentEvents, PaymentInitiator, PaymentWatcher,
};

/// Active payment watches keyed by order id.
pub type WatchRegistry = Arc<Mutex<HashMap<String, Arc<PaymentWatcher>>>>;

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub api: Arc<dyn OrderApi>,
  pub cart: GuestCartStore,
  pub drafts: DraftStore,
  pub payments: PaymentInitiator,
  pub events: PaymentEvents,
  pub checkout: CheckoutFlow,
  pub watches: WatchRegistry,
}
