// vitrine_storefront/src/main.rs

mod config;
mod errors;
mod services;
mod state;
mod web;

use crate::config::AppConfig;
use crate::services::payment_mock::MockPaymentProvider;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use vitrine::{
  CartConfig, CheckoutFlow, DraftConfig, DraftStore, FileStore, GuestCartStore, HttpOrderApi, OrderApi,
  PaymentEvents, PaymentInitiator, SharedClock, SharedStore, SystemClock,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };
  let reconcile = app_config
    .reconcile()
    .map_err(|e| std::io::Error::other(e.to_string()))?;

  // Local storage, shared by the cart, the drafts and the auth token lookup.
  let store: SharedStore = Arc::new(FileStore::open(
    &app_config.storage_file,
    Some(app_config.storage_quota_bytes),
  ));
  let clock: SharedClock = Arc::new(SystemClock);
  let drafts = DraftStore::new(
    store.clone(),
    clock.clone(),
    DraftConfig::default().with_quota_bytes(app_config.storage_quota_bytes),
  );
  let cart = GuestCartStore::new(store.clone(), clock, CartConfig::default()).with_drafts(drafts.clone());
  tracing::info!(path = %app_config.storage_file, "Local storage ready.");

  let api: Arc<dyn OrderApi> = Arc::new(
    HttpOrderApi::new(app_config.orders_api_base_url.clone())
      .map_err(|e| std::io::Error::other(e.to_string()))?
      .with_token_store(store),
  );
  let payments = PaymentInitiator::new(Arc::new(MockPaymentProvider::new(
    app_config.mock_payment_account_id.clone(),
  )));
  let events = PaymentEvents::default();
  let checkout = CheckoutFlow::new(api.clone(), cart.clone(), events.clone(), reconcile);

  let app_state = AppState {
    config: app_config.clone(),
    api,
    cart,
    drafts,
    payments,
    events,
    checkout,
    watches: Default::default(),
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
