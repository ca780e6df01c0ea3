// vitrine/src/lib.rs

//! Vitrine: the client core of a storefront checkout.
//!
//! It covers the parts of checkout that outlive a single request:
//!  - Payment reconciliation that polls an order until the provider settles it,
//!    with push notifications short-circuiting the schedule.
//!  - A guest cart persisted with a time-to-live.
//!  - Per-product customization drafts with quota-aware eviction.
//!  - PIX and card payment initiation through a pluggable provider.
//!
//! Every collaborator (storage, clock, order API, provider, push hub) is
//! constructed by the application and passed in.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod drafts;
pub mod error;
pub mod models;
pub mod payment;
pub mod push;
pub mod reconcile;
pub mod storage;

// --- Re-exports for the Public API ---

pub use crate::api::{HttpOrderApi, OrderApi, AUTH_TOKEN_KEY};
pub use crate::cart::{GuestCartSnapshot, GuestCartStore, GUEST_CART_KEY};
pub use crate::checkout::{CheckoutFlow, CheckoutOutcome};
pub use crate::clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use crate::config::{CartConfig, DraftConfig, ReconcileConfig};
pub use crate::drafts::{
  compactify_customization, expand_customization, CustomizationDraft, DraftInfo, DraftSaveOutcome, DraftStore,
  StorageQuota,
};
pub use crate::error::{StorageError, VitrineError, VitrineResult};
pub use crate::models::{CartItem, Order, OrderStatus, PaymentInfo, PaymentStatus};
pub use crate::payment::{PaymentInitiator, PaymentProvider};
pub use crate::push::{PaymentEvent, PaymentEventKind, PaymentEvents};
pub use crate::reconcile::{PaymentWatcher, WatchCallbacks, WatchOptions, WatchSnapshot, WatchStatus};
pub use crate::storage::{FileStore, KeyValueStore, MemoryStore, SharedStore};
