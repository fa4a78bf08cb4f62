use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::core::{MatchEngine, MatchError, MetricsError, RateTable};
use crate::models::{MatchOutcome, MatchView, NewSubmission, Role, Submission, SubmissionRequest};
use crate::services::match_cache::LatestMatchCache;
use crate::services::store::{StoreError, SubmissionStore};

/// Errors from the submission flows
#[derive(Debug, Error)]
pub enum CarpoolError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),
}

impl From<MatchError> for CarpoolError {
    fn from(value: MatchError) -> Self {
        match value {
            MatchError::Store(e) => CarpoolError::Store(e),
        }
    }
}

impl CarpoolError {
    /// Store failures may succeed on retry; validation and metric errors won't
    pub fn is_retryable(&self) -> bool {
        matches!(self, CarpoolError::Store(e) if e.is_retryable())
    }
}

/// Result of a taker submission
#[derive(Debug, Clone)]
pub struct RideRequestOutcome {
    pub taker: Submission,
    /// Both views when a provider was found
    pub matched: Option<(MatchView, MatchView)>,
}

/// Submission flows for takers and providers
///
/// Takers are persisted, matched, and on success both views land in the
/// latest match cache. Providers are only persisted; matching is always
/// started by a taker.
#[derive(Clone)]
pub struct CarpoolService {
    store: Arc<dyn SubmissionStore>,
    engine: MatchEngine,
    rates: Arc<RateTable>,
    latest: Arc<LatestMatchCache>,
}

impl CarpoolService {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        engine: MatchEngine,
        rates: RateTable,
        latest: Arc<LatestMatchCache>,
    ) -> Self {
        Self {
            store,
            engine,
            rates: Arc::new(rates),
            latest,
        }
    }

    pub fn store(&self) -> &Arc<dyn SubmissionStore> {
        &self.store
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn latest(&self) -> &Arc<LatestMatchCache> {
        &self.latest
    }

    /// Validate and persist a taker, then try to pair it with a provider
    pub async fn request_ride(&self, request: SubmissionRequest) -> Result<RideRequestOutcome, CarpoolError> {
        let submission = into_submission(request, Role::Taker)?;
        self.submit_taker(submission).await
    }

    /// Validate and persist a provider offer
    pub async fn offer_ride(&self, request: SubmissionRequest) -> Result<Submission, CarpoolError> {
        let submission = into_submission(request, Role::Provider)?;
        self.submit_provider(submission).await
    }

    pub async fn submit_taker(&self, submission: NewSubmission) -> Result<RideRequestOutcome, CarpoolError> {
        if submission.role != Role::Taker {
            return Err(CarpoolError::Validation(format!(
                "expected a taker submission, got {}",
                submission.role
            )));
        }

        let taker = self.store.append(submission).await?;

        let provider = match self.engine.find_match(&taker).await? {
            MatchOutcome::Matched(provider) => provider,
            MatchOutcome::NotFound => {
                tracing::info!("No provider found for taker {}", taker.id);
                return Ok(RideRequestOutcome { taker, matched: None });
            }
        };

        // Metrics come from the taker's own route, not the provider's
        let metrics = self
            .rates
            .route_metrics(taker.source, taker.destination, taker.vehicle_type)?;

        let match_id = Uuid::new_v4();
        let matched_at = Utc::now();
        let taker_view = MatchView::from_submission(match_id, &taker, metrics, matched_at);
        let provider_view = MatchView::from_submission(match_id, &provider, metrics, matched_at);

        self.latest.record_match(taker_view.clone(), provider_view.clone());

        tracing::info!(
            "Matched taker {} with provider {} ({:.2} km, cost {:.2}, co2 avoided {:.3} kg)",
            taker.id,
            provider.id,
            metrics.distance_km,
            metrics.estimated_cost,
            metrics.co2_avoided_kg
        );

        Ok(RideRequestOutcome {
            taker,
            matched: Some((taker_view, provider_view)),
        })
    }

    pub async fn submit_provider(&self, submission: NewSubmission) -> Result<Submission, CarpoolError> {
        if submission.role != Role::Provider {
            return Err(CarpoolError::Validation(format!(
                "expected a provider submission, got {}",
                submission.role
            )));
        }

        let provider = self.store.append(submission).await?;
        tracing::info!("Provider offer {} stored", provider.id);

        Ok(provider)
    }

    pub fn taker_match(&self) -> Option<MatchView> {
        self.latest.taker_match()
    }

    pub fn provider_match(&self) -> Option<MatchView> {
        self.latest.provider_match()
    }
}

fn into_submission(request: SubmissionRequest, role: Role) -> Result<NewSubmission, CarpoolError> {
    request
        .into_new_submission(role)
        .map_err(|e| CarpoolError::Validation(e.to_string()))
}
