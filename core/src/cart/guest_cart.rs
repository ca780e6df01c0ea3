// vitrine/src/cart/guest_cart.rs

use crate::clock::SharedClock;
use crate::config::CartConfig;
use crate::drafts::DraftStore;
use crate::error::StorageError;
use crate::models::CartItem;
use crate::storage::SharedStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const GUEST_CART_KEY: &str = "vitrine:guest_cart";

/// The single persisted cart of an anonymous visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCartSnapshot {
  pub items: Vec<CartItem>,
  pub saved_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

/// Best-effort persistence of the guest cart. Storage failures are logged and
/// never surface to the caller.
#[derive(Clone)]
pub struct GuestCartStore {
  store: SharedStore,
  clock: SharedClock,
  config: CartConfig,
  drafts: Option<DraftStore>,
}

impl GuestCartStore {
  pub fn new(store: SharedStore, clock: SharedClock, config: CartConfig) -> Self {
    Self {
      store,
      clock,
      config,
      drafts: None,
    }
  }

  /// Attaches the draft store whose entries are cleared with the cart and
  /// evicted when a cart write hits the quota.
  pub fn with_drafts(mut self, drafts: DraftStore) -> Self {
    self.drafts = Some(drafts);
    self
  }

  /// Overwrites the snapshot. Returns what was written, or `None` when the
  /// write failed.
  pub fn save(&self, items: &[CartItem]) -> Option<GuestCartSnapshot> {
    let now = self.clock.now();
    let snapshot = GuestCartSnapshot {
      items: items.to_vec(),
      saved_at: now,
      expires_at: now + self.config.ttl,
    };
    let body = match serde_json::to_string(&snapshot) {
      Ok(body) => body,
      Err(e) => {
        warn!(error = %e, "Failed to serialize guest cart.");
        return None;
      }
    };

    match self.store.set(GUEST_CART_KEY, &body) {
      Ok(()) => {}
      Err(e) if e.is_quota_exceeded() && self.drafts.is_some() => {
        info!("Guest cart hit the storage quota, freeing draft space and retrying.");
        self.free_draft_space();
        if let Err(e) = self.store.set(GUEST_CART_KEY, &body) {
          warn!(error = %e, "Guest cart save failed after freeing space.");
          return None;
        }
      }
      Err(e) => {
        warn!(error = %e, "Guest cart save failed.");
        return None;
      }
    }

    debug!(items = snapshot.items.len(), "Guest cart saved.");
    Some(snapshot)
  }

  /// Returns the snapshot, or `None` when absent, expired or unreadable.
  /// Expired and corrupt snapshots are purged.
  pub fn load(&self) -> Option<GuestCartSnapshot> {
    let raw = match self.store.get(GUEST_CART_KEY) {
      Ok(Some(raw)) => raw,
      Ok(None) => return None,
      Err(e) => {
        warn!(error = %e, "Failed to read guest cart.");
        return None;
      }
    };

    let snapshot: GuestCartSnapshot = match serde_json::from_str(&raw) {
      Ok(snapshot) => snapshot,
      Err(e) => {
        warn!(error = %e, "Guest cart is corrupt, discarding.");
        self.purge();
        return None;
      }
    };

    if self.clock.now() > snapshot.expires_at {
      debug!(expires_at = %snapshot.expires_at, "Guest cart expired.");
      self.purge();
      return None;
    }
    Some(snapshot)
  }

  /// Removes the snapshot together with the drafts of the products it held.
  pub fn clear(&self) {
    if let Some(drafts) = &self.drafts {
      if let Some(snapshot) = self.peek() {
        for item in &snapshot.items {
          if let Err(e) = drafts.remove(&item.product_id) {
            warn!(product_id = %item.product_id, error = %e, "Failed to remove draft.");
          }
        }
      }
    }
    self.purge();
  }

  // Reads the snapshot without applying expiry.
  fn peek(&self) -> Option<GuestCartSnapshot> {
    let raw = self.store.get(GUEST_CART_KEY).ok().flatten()?;
    serde_json::from_str(&raw).ok()
  }

  fn free_draft_space(&self) {
    let Some(drafts) = &self.drafts else {
      return;
    };
    if let Err(e) = release_drafts(drafts) {
      warn!(error = %e, "Failed to free draft space.");
    }
  }

  fn purge(&self) {
    if let Err(e) = self.store.delete(GUEST_CART_KEY) {
      warn!(error = %e, "Failed to remove guest cart.");
    }
  }
}

fn release_drafts(drafts: &DraftStore) -> Result<(), StorageError> {
  let expired = drafts.purge_expired()?;
  let evicted = drafts.evict_to(drafts.config().retain)?;
  debug!(expired = expired.len(), evicted = evicted.len(), "Released draft storage.");
  Ok(())
}
