// vitrine_storefront/src/services/payment_mock.rs
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{info, instrument};
use uuid::Uuid;
use vitrine::payment::{
  CardPaymentReceipt, CardPaymentRequest, PaymentProvider, PixPayment, PixPaymentRequest, ProviderError,
};

/// Stand-in for the payment provider SDK. Amounts ending in `123` cents are
/// rejected so the failure path can be exercised by hand.
#[derive(Debug, Clone)]
pub struct MockPaymentProvider {
  account_id: String,
}

impl MockPaymentProvider {
  pub fn new(account_id: impl Into<String>) -> Self {
    Self {
      account_id: account_id.into(),
    }
  }

  fn rejects(amount_cents: i64) -> bool {
    amount_cents % 1000 == 123
  }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
  fn name(&self) -> &str {
    "mock"
  }

  #[instrument(skip_all, fields(order_id = %request.order_id, amount = request.amount_cents, payment_account_id = %self.account_id))]
  async fn create_pix_payment(&self, request: &PixPaymentRequest) -> Result<PixPayment, ProviderError> {
    info!("Simulating PIX charge creation for account '{}'", self.account_id);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await; // Simulate network latency

    if request.amount_cents <= 0 {
      return Err(ProviderError::InvalidRequest("amount must be greater than zero".to_string()));
    }
    let payment_id = format!("mock_pix_{}", Uuid::new_v4());
    Ok(PixPayment {
      qr_code: format!(
        "00020126580014br.gov.bcb.pix0136{}5204000053039865406{:.2}6304",
        self.account_id,
        request.amount_cents as f64 / 100.0
      ),
      qr_code_base64: "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII="
        .to_string(),
      expires_at: Utc::now() + Duration::minutes(30),
      provider_payment_id: payment_id,
    })
  }

  #[instrument(skip_all, fields(order_id = %request.order_id, amount = request.amount_cents, payment_account_id = %self.account_id))]
  async fn submit_card_payment(&self, request: &CardPaymentRequest) -> Result<CardPaymentReceipt, ProviderError> {
    info!("Simulating card payment via '{}'", request.form.payment_method_id);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await; // Simulate processing

    let payment_id = format!("mock_card_{}", Uuid::new_v4());
    if Self::rejects(request.amount_cents) {
      info!("Mock card payment REJECTED for {}", payment_id);
      return Ok(CardPaymentReceipt {
        provider_payment_id: payment_id,
        status: "rejected".to_string(),
        status_detail: Some("cc_rejected_other_reason".to_string()),
      });
    }
    info!("Mock card payment IN PROCESS for {}", payment_id);
    Ok(CardPaymentReceipt {
      provider_payment_id: payment_id,
      status: "in_process".to_string(),
      status_detail: Some("pending_contingency".to_string()),
    })
  }
}
