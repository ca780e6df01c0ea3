// vitrine/src/reconcile/mod.rs

//! Payment reconciliation: polls an order until its payment reaches a
//! terminal state, with push notifications short-circuiting the schedule.

pub mod classify;
pub mod session;
pub mod watcher;

pub use classify::{classify, Verdict};
pub use session::{WatchSnapshot, WatchStatus};
pub use watcher::{OrderCallback, PaymentWatcher, TimeoutCallback, WatchCallbacks, WatchOptions};
