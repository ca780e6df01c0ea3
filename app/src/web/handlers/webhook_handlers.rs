// vitrine_storefront/src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use vitrine::PaymentEvent;

use crate::errors::AppError;
use crate::state::AppState;

/// The parts of a provider notification needed to route it to a watch.
#[derive(Deserialize, Debug)]
pub struct PaymentNotification {
  #[serde(default, alias = "external_reference", alias = "orderId")]
  pub order_id: Option<String>,
  #[serde(default)]
  pub action: Option<String>,
  #[serde(default)]
  pub status: Option<String>,
}

impl PaymentNotification {
  pub fn is_approval(&self) -> bool {
    let approved = |s: &Option<String>, needle: &str| s.as_deref().is_some_and(|v| v.eq_ignore_ascii_case(needle));
    approved(&self.status, "approved") || approved(&self.action, "payment.approved")
  }
}

#[instrument(
    name = "handler::payment_webhook",
    skip(app_state, req, body),
    fields(webhook_source = %webhook_source, content_type = ?req.headers().get("content-type").and_then(|h| h.to_str().ok()))
)]
pub async fn payment_webhook_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  webhook_source: web::Path<String>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let source = webhook_source.into_inner();
  info!("Received webhook from '{}'. Payload size: {} bytes.", source, body.len());

  let notification: PaymentNotification = serde_json::from_slice(&body)
    .map_err(|e| AppError::Validation(format!("Malformed webhook payload: {}", e)))?;

  let Some(order_id) = notification.order_id.clone() else {
    // Acknowledge anyway so the provider does not retry.
    warn!("Webhook from '{}' carried no order reference, ignoring.", source);
    return Ok(HttpResponse::Ok().json(serde_json::json!({"status": "ignored"})));
  };

  let event = if notification.is_approval() {
    PaymentEvent::approved(order_id)
  } else {
    PaymentEvent::updated(order_id)
  };
  let kind = event.kind;
  let delivered = app_state.events.publish(event);
  info!(?kind, delivered, "Payment notification forwarded to watchers.");

  Ok(HttpResponse::Ok().json(serde_json::json!({"status": "received", "delivered": delivered})))
}
