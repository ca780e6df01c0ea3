// vitrine_storefront/src/services/mod.rs

pub mod payment_mock;
