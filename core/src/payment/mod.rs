// vitrine/src/payment/mod.rs

//! Payment initiation against the provider SDK.

pub mod initiator;
pub mod provider;

pub use initiator::PaymentInitiator;
pub use provider::{
  CardPaymentForm, CardPaymentReceipt, CardPaymentRequest, PaymentProvider, PixPayment, PixPaymentRequest,
  ProviderError,
};
