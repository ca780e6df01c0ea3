// vitrine/src/models/mod.rs

//! Data structures shared with the remote API and the local stores.

pub mod cart_item;
pub mod order;

pub use cart_item::CartItem;
pub use order::{Order, OrderStatus, PaymentInfo, PaymentStatus};
