use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewSubmission, Role, Submission};

/// Errors that can occur in a submission store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the caller may reasonably retry the same operation
    ///
    /// Only connection-level and pool failures qualify. Database errors are
    /// retryable only for transient SQLSTATE classes.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::SqlxError(e) => match e {
                sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed => true,
                sqlx::Error::Database(db) => is_transient_sqlstate(db.code().as_deref()),
                _ => false,
            },
            StoreError::Unavailable(_) => true,
            StoreError::MigrateError(_) | StoreError::CorruptRecord { .. } => false,
        }
    }
}

/// Transient SQLSTATEs: classes 08, 40 and 53, plus admin/crash shutdowns.
/// Integrity violations (class 23) are not retryable.
fn is_transient_sqlstate(code: Option<&str>) -> bool {
    match code {
        Some(code) => {
            code.starts_with("08")
                || code.starts_with("40")
                || code.starts_with("53")
                || matches!(code, "57P01" | "57P02" | "57P03")
        }
        None => false,
    }
}

/// Append-only persistence for taker and provider submissions
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist a submission, assigning its id and creation time
    async fn append(&self, submission: NewSubmission) -> Result<Submission, StoreError>;

    /// All submissions for `role` created at or after `since`, in insertion order
    async fn query_recent_by_role(
        &self,
        role: Role,
        since: DateTime<Utc>,
    ) -> Result<Vec<Submission>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Process-local store backed by a vector
///
/// Used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    submissions: RwLock<Vec<Submission>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already-stamped submission, keeping its `created_at`
    ///
    /// Lets tests and fixtures place records in the past.
    pub async fn insert(&self, submission: Submission) {
        self.submissions.write().await.push(submission);
    }

    pub async fn len(&self) -> usize {
        self.submissions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.submissions.read().await.is_empty()
    }
}

#[async_trait]
impl SubmissionStore for InMemoryStore {
    async fn append(&self, submission: NewSubmission) -> Result<Submission, StoreError> {
        let stored = submission.into_submission(Uuid::new_v4(), Utc::now());
        self.submissions.write().await.push(stored.clone());

        tracing::debug!("Stored {} submission {}", stored.role, stored.id);
        Ok(stored)
    }

    async fn query_recent_by_role(
        &self,
        role: Role,
        since: DateTime<Utc>,
    ) -> Result<Vec<Submission>, StoreError> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .iter()
            .filter(|s| s.role == role && s.created_at >= since)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
