// tests/guest_cart_tests.rs
mod common;

use chrono::Duration;
use common::*;
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;
use vitrine::{
  CartConfig, CartItem, DraftConfig, DraftStore, GuestCartStore, KeyValueStore, MemoryStore, SharedStore,
  GUEST_CART_KEY,
};

fn customization() -> serde_json::Map<String, serde_json::Value> {
  match json!({ "text": "x".repeat(300), "logo_visible": true }) {
    serde_json::Value::Object(map) => map,
    _ => unreachable!(),
  }
}

#[test]
#[serial]
fn test_save_and_load_round_trip() {
  setup_tracing();
  let store: SharedStore = Arc::new(MemoryStore::new());
  let (_clock, shared_clock) = manual_clock();
  let cart = GuestCartStore::new(store, shared_clock, CartConfig::default());

  let mut item = CartItem::new("mug-01", 2);
  item.additionals = Some(vec!["gift-wrap".to_string()]);
  let saved = cart.save(&[item.clone(), CartItem::new("tee-02", 1)]).unwrap();
  assert_eq!(saved.saved_at, start_instant());
  assert_eq!(saved.expires_at, start_instant() + Duration::hours(24));

  let loaded = cart.load().unwrap();
  assert_eq!(loaded, saved);
  assert_eq!(loaded.items[0], item);
}

#[test]
#[serial]
fn test_save_overwrites_previous_snapshot() {
  setup_tracing();
  let store: SharedStore = Arc::new(MemoryStore::new());
  let (clock, shared_clock) = manual_clock();
  let cart = GuestCartStore::new(store, shared_clock, CartConfig::default());

  cart.save(&cart_items(&["a", "b"]));
  clock.advance(Duration::minutes(5));
  cart.save(&cart_items(&["c"]));

  let loaded = cart.load().unwrap();
  assert_eq!(loaded.items, cart_items(&["c"]));
  assert_eq!(loaded.saved_at, start_instant() + Duration::minutes(5));
}

#[test]
#[serial]
fn test_snapshot_expires_after_ttl_and_is_purged() {
  setup_tracing();
  let store: SharedStore = Arc::new(MemoryStore::new());
  let (clock, shared_clock) = manual_clock();
  let cart = GuestCartStore::new(store.clone(), shared_clock, CartConfig::default());
  cart.save(&cart_items(&["mug-01"])).unwrap();

  clock.advance(Duration::hours(24));
  assert!(cart.load().is_some(), "still valid exactly at expiry");

  clock.advance(Duration::hours(1));
  assert!(cart.load().is_none());
  assert!(store.get(GUEST_CART_KEY).unwrap().is_none());
}

#[test]
#[serial]
fn test_corrupt_snapshot_is_purged() {
  setup_tracing();
  let store: SharedStore = Arc::new(MemoryStore::new());
  store.set(GUEST_CART_KEY, r#"{"items": "nope"}"#).unwrap();
  let (_clock, shared_clock) = manual_clock();
  let cart = GuestCartStore::new(store.clone(), shared_clock, CartConfig::default());

  assert!(cart.load().is_none());
  assert!(store.get(GUEST_CART_KEY).unwrap().is_none());
}

#[test]
#[serial]
fn test_clear_removes_snapshot_and_its_drafts() {
  setup_tracing();
  let store: SharedStore = Arc::new(MemoryStore::new());
  let (_clock, shared_clock) = manual_clock();
  let drafts = DraftStore::new(store.clone(), shared_clock.clone(), DraftConfig::default());
  let cart = GuestCartStore::new(store.clone(), shared_clock, CartConfig::default()).with_drafts(drafts.clone());

  drafts.save("mug-01", &customization()).unwrap();
  drafts.save("unrelated", &customization()).unwrap();
  cart.save(&cart_items(&["mug-01", "tee-02"])).unwrap();

  cart.clear();
  assert!(cart.load().is_none());
  assert!(drafts.load("mug-01").is_none());
  assert!(drafts.load("unrelated").is_some());

  // Clearing an empty cart is harmless.
  cart.clear();
}

#[test]
#[serial]
fn test_quota_error_is_swallowed() {
  setup_tracing();
  let store: SharedStore = Arc::new(MemoryStore::with_capacity_bytes(16));
  let (_clock, shared_clock) = manual_clock();
  let cart = GuestCartStore::new(store.clone(), shared_clock, CartConfig::default());

  assert!(cart.save(&cart_items(&["mug-01"])).is_none());
  assert!(cart.load().is_none());
}

#[test]
#[serial]
fn test_quota_error_frees_draft_space_and_retries() {
  setup_tracing();
  let items = cart_items(&["mug-01", "tee-02"]);

  // Measure how much room five drafts take, then size the backend so the
  // cart only fits once drafts are gone.
  let sizing: SharedStore = Arc::new(MemoryStore::new());
  let (_c, sizing_clock) = manual_clock();
  let sizing_drafts = DraftStore::new(sizing.clone(), sizing_clock, DraftConfig::default());
  for i in 0..5 {
    sizing_drafts.save(&format!("old-{i}"), &customization()).unwrap();
  }
  let drafts_bytes = sizing.used_bytes().unwrap();

  let store: SharedStore = Arc::new(MemoryStore::with_capacity_bytes(drafts_bytes + 10));
  let (clock, shared_clock) = manual_clock();
  let drafts = DraftStore::new(store.clone(), shared_clock.clone(), DraftConfig::default());
  for i in 0..5 {
    assert!(drafts.save(&format!("old-{i}"), &customization()).unwrap().is_saved());
  }
  let cart = GuestCartStore::new(store.clone(), shared_clock, CartConfig::default()).with_drafts(drafts.clone());

  // Drafts have lapsed by the time the visitor returns to the cart.
  clock.advance(Duration::hours(25));
  let saved = cart.save(&items).expect("cart should fit after stale drafts are purged");
  assert_eq!(saved.items, items);
  assert!(drafts.list_all_drafts().is_empty());
  assert_eq!(cart.load().unwrap().items, items);
}
