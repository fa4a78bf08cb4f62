use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::core::filters::{is_eligible, EligibilityRules};
use crate::models::{MatchOutcome, Role, Submission};
use crate::services::store::{StoreError, SubmissionStore};

/// Errors from a match attempt
///
/// A store failure is kept distinct from `MatchOutcome::NotFound` so callers
/// can retry.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Failed to query providers: {0}")]
    Store(#[from] StoreError),
}

/// Matching configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSettings {
    /// How far back provider submissions are considered
    pub window: Duration,
    pub rules: EligibilityRules,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            window: Duration::minutes(10),
            rules: EligibilityRules::default(),
        }
    }
}

/// Pairs a taker with a recently submitted provider
///
/// # Pipeline
/// 1. Query providers created within the window before the taker's submission
/// 2. Filter by vehicle type, pickup proximity and destination
/// 3. First eligible candidate in store order wins
///
/// Matching is best-effort: nothing is claimed, so one provider can be handed
/// to several takers that arrive close together.
#[derive(Clone)]
pub struct MatchEngine {
    store: Arc<dyn SubmissionStore>,
    settings: MatchSettings,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn SubmissionStore>, settings: MatchSettings) -> Self {
        Self { store, settings }
    }

    pub fn with_default_settings(store: Arc<dyn SubmissionStore>) -> Self {
        Self::new(store, MatchSettings::default())
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Oldest provider `created_at` still eligible for `taker`
    pub fn window_start(&self, taker: &Submission) -> DateTime<Utc> {
        taker.created_at - self.settings.window
    }

    /// Find the first eligible provider for a taker
    pub async fn find_match(&self, taker: &Submission) -> Result<MatchOutcome, MatchError> {
        let since = self.window_start(taker);
        let candidates = self.store.query_recent_by_role(Role::Provider, since).await?;
        let total_candidates = candidates.len();

        let outcome = match candidates
            .into_iter()
            .find(|candidate| is_eligible(taker, candidate, since, &self.settings.rules))
        {
            Some(provider) => MatchOutcome::Matched(provider),
            None => MatchOutcome::NotFound,
        };

        tracing::debug!(
            "Taker {} scanned {} providers since {}: matched={}",
            taker.id,
            total_candidates,
            since,
            outcome.is_matched()
        );

        Ok(outcome)
    }

    /// Every eligible provider for a taker, in store order
    pub async fn eligible_candidates(&self, taker: &Submission) -> Result<Vec<Submission>, MatchError> {
        let since = self.window_start(taker);
        let candidates = self.store.query_recent_by_role(Role::Provider, since).await?;

        Ok(candidates
            .into_iter()
            .filter(|candidate| is_eligible(taker, candidate, since, &self.settings.rules))
            .collect())
    }
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
