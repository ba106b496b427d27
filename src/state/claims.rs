use crate::state::Fingerprint;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of fingerprints claimed during one crawl session
///
/// Shared by every concurrently running entry workflow. A claim is an atomic
/// check-and-insert, so exactly one caller wins for any given fingerprint.
#[derive(Debug, Default)]
pub struct ClaimSet {
    seen: Mutex<HashSet<Fingerprint>>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `fingerprint` for the caller
    ///
    /// Returns `true` on the first claim and `false` for every later one.
    pub fn try_claim(&self, fingerprint: &Fingerprint) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        seen.insert(fingerprint.clone())
    }

    /// Returns true if `fingerprint` has already been claimed
    pub fn is_claimed(&self, fingerprint: &Fingerprint) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(fingerprint)
    }

    /// Number of distinct fingerprints claimed so far
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
