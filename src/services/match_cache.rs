use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{MatchPair, MatchView};

/// Most recent match, one slot per role
///
/// Both slots live behind a single lock so a reader sees either the previous
/// pair or the new one, never a mix. Starts empty, is overwritten on every
/// match and never expires.
#[derive(Debug, Default)]
pub struct LatestMatchCache {
    latest: RwLock<Option<MatchPair>>,
}

impl LatestMatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both slots at once
    pub fn record_match(&self, taker: MatchView, provider: MatchView) {
        tracing::debug!("Recording match {} in latest match cache", taker.match_id);
        *self.write() = Some(MatchPair { taker, provider });
    }

    /// View of the taker side of the latest match
    pub fn taker_match(&self) -> Option<MatchView> {
        self.read().as_ref().map(|pair| pair.taker.clone())
    }

    /// View of the provider side of the latest match
    pub fn provider_match(&self) -> Option<MatchView> {
        self.read().as_ref().map(|pair| pair.provider.clone())
    }

    /// Both sides from a single read
    pub fn latest(&self) -> Option<MatchPair> {
        self.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_none()
    }

    // Writers never panic while holding the lock, so a poisoned lock still
    // holds a complete pair.
    fn read(&self) -> RwLockReadGuard<'_, Option<MatchPair>> {
        self.latest.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<MatchPair>> {
        self.latest.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
