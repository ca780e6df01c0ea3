// vitrine/src/drafts/mod.rs

//! Per-product customization drafts: compaction, TTL and quota-aware eviction.

pub mod compact;
pub mod store;

pub use compact::{compactify_customization, expand_customization, looks_like_binary_payload};
pub use store::{CustomizationDraft, DraftInfo, DraftSaveOutcome, DraftStore, StorageQuota, DRAFT_KEY_PREFIX};
