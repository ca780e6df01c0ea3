// vitrine/src/payment/initiator.rs

use super::provider::{
  CardPaymentForm, CardPaymentReceipt, CardPaymentRequest, PaymentProvider, PixPayment, PixPaymentRequest,
};
use crate::error::{VitrineError, VitrineResult};
use crate::models::{Order, OrderStatus};
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Starts PIX and card payments for orders that are still awaiting payment.
#[derive(Clone)]
pub struct PaymentInitiator {
  provider: Arc<dyn PaymentProvider>,
}

impl PaymentInitiator {
  pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
    Self { provider }
  }

  pub fn provider_name(&self) -> &str {
    self.provider.name()
  }

  #[instrument(name = "PaymentInitiator::start_pix", skip_all, fields(order_id = %order.id, provider = %self.provider.name()), err(Display))]
  pub async fn start_pix(&self, order: &Order, payer_email: &str) -> VitrineResult<PixPayment> {
    validate_payable(order)?;
    if payer_email.trim().is_empty() {
      return Err(VitrineError::Payment("payer email is required for PIX".to_string()));
    }

    let request = PixPaymentRequest {
      order_id: order.id.clone(),
      amount_cents: order.total_cents,
      payer_email: payer_email.to_string(),
      description: Some(format!("Order {}", order.id)),
    };
    let pix = self
      .provider
      .create_pix_payment(&request)
      .await
      .map_err(|e| VitrineError::Payment(e.to_string()))?;

    event!(
      Level::INFO,
      provider_payment_id = %pix.provider_payment_id,
      expires_at = %pix.expires_at,
      "PIX payment created."
    );
    Ok(pix)
  }

  #[instrument(name = "PaymentInitiator::submit_card", skip_all, fields(order_id = %order.id, provider = %self.provider.name()), err(Display))]
  pub async fn submit_card(&self, order: &Order, form: CardPaymentForm) -> VitrineResult<CardPaymentReceipt> {
    validate_payable(order)?;
    if form.token.is_empty() {
      return Err(VitrineError::Payment("card form was not tokenized".to_string()));
    }
    if form.installments == 0 {
      return Err(VitrineError::Payment("installments must be at least 1".to_string()));
    }

    let request = CardPaymentRequest {
      order_id: order.id.clone(),
      amount_cents: order.total_cents,
      form,
    };
    let receipt = self
      .provider
      .submit_card_payment(&request)
      .await
      .map_err(|e| VitrineError::Payment(e.to_string()))?;

    event!(
      Level::INFO,
      provider_payment_id = %receipt.provider_payment_id,
      status = %receipt.status,
      "Card payment submitted."
    );
    Ok(receipt)
  }
}

fn validate_payable(order: &Order) -> VitrineResult<()> {
  if order.status != OrderStatus::Pending {
    return Err(VitrineError::Payment(format!(
      "order '{}' is {:?}, only pending orders can be paid",
      order.id, order.status
    )));
  }
  if order.total_cents <= 0 {
    return Err(VitrineError::Payment(format!(
      "order '{}' has a non-positive total",
      order.id
    )));
  }
  Ok(())
}
