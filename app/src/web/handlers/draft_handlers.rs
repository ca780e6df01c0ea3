// vitrine_storefront/src/web/handlers/draft_handlers.rs

use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::{json, Map, Value};
use tracing::instrument;
use vitrine::{DraftSaveOutcome, VitrineError};

use crate::errors::AppError;
use crate::state::AppState;

#[instrument(name = "handler::list_drafts", skip(app_state))]
pub async fn list_drafts_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(json!({
      "drafts": app_state.drafts.list_all_drafts(),
      "quota": app_state.drafts.get_storage_quota(),
  })))
}

#[instrument(name = "handler::load_draft", skip(app_state), fields(product_id = %product_id))]
pub async fn load_draft_handler(
  app_state: web::Data<AppState>,
  product_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = product_id.into_inner();
  let draft = app_state
    .drafts
    .load(&product_id)
    .ok_or_else(|| AppError::NotFound(format!("No draft for product '{}'.", product_id)))?;
  Ok(HttpResponse::Ok().json(json!({
      "productId": draft.product_id,
      "data": draft.data,
      "savedAt": draft.saved_at,
      "expiresAt": draft.expires_at,
  })))
}

#[instrument(name = "handler::save_draft", skip(app_state, req_payload), fields(product_id = %product_id))]
pub async fn save_draft_handler(
  app_state: web::Data<AppState>,
  product_id: web::Path<String>,
  req_payload: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
  let outcome = app_state
    .drafts
    .save(&product_id, &req_payload)
    .map_err(VitrineError::from)?;
  match outcome {
    DraftSaveOutcome::Saved { bytes, evicted } => Ok(HttpResponse::Ok().json(json!({
        "bytes": bytes,
        "evicted": evicted,
    }))),
    DraftSaveOutcome::QuotaExceeded { requested, used, limit } => {
      Ok(HttpResponse::build(StatusCode::INSUFFICIENT_STORAGE).json(json!({
          "error": "Draft storage is full",
          "requested": requested,
          "used": used,
          "limit": limit,
      })))
    }
  }
}

#[instrument(name = "handler::delete_draft", skip(app_state), fields(product_id = %product_id))]
pub async fn delete_draft_handler(
  app_state: web::Data<AppState>,
  product_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  app_state.drafts.remove(&product_id).map_err(VitrineError::from)?;
  Ok(HttpResponse::NoContent().finish())
}
