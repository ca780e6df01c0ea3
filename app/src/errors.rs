// vitrine_storefront/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use vitrine::VitrineError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Payment Processing Error: {0}")]
  Payment(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Order API Error: {0}")]
  Upstream(String),

  #[error("Storefront Core Error: {source}")]
  Core {
    #[source]
    source: VitrineError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<VitrineError> for AppError {
  fn from(err: VitrineError) -> Self {
    match err {
      VitrineError::Payment(m) => AppError::Payment(m),
      VitrineError::Config(m) => AppError::Config(m),
      VitrineError::Api { order_id, message } => AppError::Upstream(format!("order '{}': {}", order_id, message)),
      other => AppError::Core { source: other },
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(format!("{:#}", err))
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Payment(m) => HttpResponse::PaymentRequired().json(json!({"error": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Upstream(m) => HttpResponse::BadGateway().json(json!({"error": "Order service error", "detail": m})),
      AppError::Core { source } => {
        tracing::error!(core_error_source = ?source, "Storefront core error details");
        HttpResponse::InternalServerError()
          .json(json!({"error": "Storefront processing error", "detail": source.to_string()}))
      }
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
