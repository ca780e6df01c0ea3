// vitrine_storefront/src/web/handlers/payment_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use vitrine::payment::CardPaymentForm;

use super::watch_handlers::ensure_watch;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StartPixRequest {
  pub order_id: String,
  pub payer_email: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCardRequest {
  pub order_id: String,
  pub form: CardPaymentForm,
}

#[instrument(name = "handler::start_pix", skip(app_state, req_payload), fields(order_id = %req_payload.order_id))]
pub async fn start_pix_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<StartPixRequest>,
) -> Result<HttpResponse, AppError> {
  let req = req_payload.into_inner();
  let order = app_state.api.fetch_order(&req.order_id).await?;
  let pix = app_state.payments.start_pix(&order, &req.payer_email).await?;

  // The QR code is on screen now; confirmation arrives by webhook or polling.
  let watcher = ensure_watch(&app_state, &order.id).await;
  info!(provider_payment_id = %pix.provider_payment_id, "PIX checkout started.");

  Ok(HttpResponse::Created().json(json!({
      "payment": pix,
      "watch": watcher.snapshot(),
  })))
}

#[instrument(name = "handler::submit_card", skip(app_state, req_payload), fields(order_id = %req_payload.order_id))]
pub async fn submit_card_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SubmitCardRequest>,
) -> Result<HttpResponse, AppError> {
  let req = req_payload.into_inner();
  let order = app_state.api.fetch_order(&req.order_id).await?;
  let receipt = app_state.payments.submit_card(&order, req.form).await?;
  let watcher = ensure_watch(&app_state, &order.id).await;
  info!(provider_payment_id = %receipt.provider_payment_id, status = %receipt.status, "Card checkout submitted.");

  Ok(HttpResponse::Created().json(json!({
      "payment": receipt,
      "watch": watcher.snapshot(),
  })))
}
