// vitrine/src/cart/mod.rs

pub mod guest_cart;

pub use guest_cart::{GuestCartSnapshot, GuestCartStore, GUEST_CART_KEY};
