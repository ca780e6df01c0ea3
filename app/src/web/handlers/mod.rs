// vitrine_storefront/src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod draft_handlers;
pub mod payment_handlers;
pub mod watch_handlers;
pub mod webhook_handlers;
