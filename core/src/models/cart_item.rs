// vitrine/src/models/cart_item.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One line of a guest cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub product_id: String,
  pub quantity: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub additionals: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub additional_colors: Option<Map<String, Value>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub customizations: Option<Map<String, Value>>,
}

impl CartItem {
  pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
    Self {
      product_id: product_id.into(),
      quantity,
      additionals: None,
      additional_colors: None,
      customizations: None,
    }
  }
}
