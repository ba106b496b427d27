//! State module for tracking crawl progress
//!
//! This module provides the per-run state for story entries.
//!
//! # Components
//!
//! - `Entry` / `Fingerprint`: A story from the listing page and its identity
//! - `EntryState`: Where an entry is in its download workflow
//! - `ClaimSet`: The session's set of claimed fingerprints (deduplication)

mod claims;
mod entry;
mod entry_state;

// Re-export main types
pub use claims::ClaimSet;
pub use entry::{Entry, Fingerprint};
pub use entry_state::EntryState;
