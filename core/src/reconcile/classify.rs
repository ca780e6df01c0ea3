// vitrine/src/reconcile/classify.rs

use crate::models::{Order, OrderStatus, PaymentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  Success,
  Failure,
  Pending,
}

/// Reads the payment outcome off a fetched order. Success is checked before
/// failure, and either wins over an exhausted attempt budget.
pub fn classify(order: &Order) -> Verdict {
  let payment = order.payment_status();
  if matches!(payment, Some(PaymentStatus::Approved | PaymentStatus::Authorized)) || order.status == OrderStatus::Paid {
    return Verdict::Success;
  }
  if matches!(
    payment,
    Some(PaymentStatus::Rejected | PaymentStatus::Cancelled | PaymentStatus::Refunded)
  ) || order.status == OrderStatus::Canceled
  {
    return Verdict::Failure;
  }
  Verdict::Pending
}
