// vitrine_storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use vitrine::CartItem;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct SaveCartRequest {
  pub items: Vec<CartItem>,
}

#[instrument(name = "handler::load_cart", skip(app_state))]
pub async fn load_cart_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let snapshot = app_state
    .cart
    .load()
    .ok_or_else(|| AppError::NotFound("No saved guest cart.".to_string()))?;
  Ok(HttpResponse::Ok().json(snapshot))
}

#[instrument(name = "handler::save_cart", skip(app_state, req_payload), fields(items = req_payload.items.len()))]
pub async fn save_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SaveCartRequest>,
) -> Result<HttpResponse, AppError> {
  if let Some(item) = req_payload.items.iter().find(|i| i.quantity == 0) {
    return Err(AppError::Validation(format!(
      "Quantity for product '{}' must be at least 1.",
      item.product_id
    )));
  }
  let snapshot = app_state
    .cart
    .save(&req_payload.items)
    .ok_or_else(|| AppError::Internal("Guest cart could not be persisted.".to_string()))?;
  info!(expires_at = %snapshot.expires_at, "Guest cart saved.");
  Ok(HttpResponse::Ok().json(snapshot))
}

#[instrument(name = "handler::clear_cart", skip(app_state))]
pub async fn clear_cart_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  app_state.cart.clear();
  Ok(HttpResponse::NoContent().finish())
}
