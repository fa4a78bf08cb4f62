use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::models::{Coordinate, NewSubmission, Role, Submission, VehicleType, SUBMISSION_SCHEMA_VERSION};
use crate::services::store::{StoreError, SubmissionStore};

const SUBMISSION_COLUMNS: &str = r#"
    id, schema_version, user_name, contact_no, role,
    source_lat, source_lng, destination_lat, destination_lng,
    source_address, destination_address, vehicle_type, created_at
"#;

/// PostgreSQL-backed submission store
///
/// Rows are append-only; `seq` keeps insertion order for the matcher's
/// first-eligible scan.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL submission store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
        )
        .await
    }
}

/// Column values of one `submissions` row, before domain parsing
#[derive(Debug, Clone)]
struct SubmissionRow {
    id: Uuid,
    schema_version: i16,
    user_name: String,
    contact_no: String,
    role: String,
    source_lat: f64,
    source_lng: f64,
    destination_lat: f64,
    destination_lng: f64,
    source_address: Option<String>,
    destination_address: Option<String>,
    vehicle_type: String,
    created_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn from_pg(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            schema_version: row.try_get("schema_version")?,
            user_name: row.try_get("user_name")?,
            contact_no: row.try_get("contact_no")?,
            role: row.try_get("role")?,
            source_lat: row.try_get("source_lat")?,
            source_lng: row.try_get("source_lng")?,
            destination_lat: row.try_get("destination_lat")?,
            destination_lng: row.try_get("destination_lng")?,
            source_address: row.try_get("source_address")?,
            destination_address: row.try_get("destination_address")?,
            vehicle_type: row.try_get("vehicle_type")?,
            created_at: row.try_get("created_at")?,
        })
    }

    /// Unknown vehicle types, roles or versions surface as `CorruptRecord` so
    /// the caller can skip the row instead of matching on it.
    fn into_submission(self) -> Result<Submission, StoreError> {
        let id = self.id;
        let corrupt = |reason: String| StoreError::CorruptRecord {
            id: id.to_string(),
            reason,
        };

        let role = self.role.parse::<Role>().map_err(corrupt)?;
        let vehicle_type = self
            .vehicle_type
            .parse::<VehicleType>()
            .map_err(|e| corrupt(e.to_string()))?;
        let schema_version = u16::try_from(self.schema_version).map_err(|e| corrupt(e.to_string()))?;

        Ok(Submission {
            id,
            schema_version,
            user_name: self.user_name,
            contact_no: self.contact_no,
            role,
            source: Coordinate::new(self.source_lat, self.source_lng),
            destination: Coordinate::new(self.destination_lat, self.destination_lng),
            source_address: self.source_address,
            destination_address: self.destination_address,
            vehicle_type,
            created_at: self.created_at,
        })
    }
}

/// Parse fetched rows, dropping corrupt ones with a warning
fn parse_rows(rows: Vec<SubmissionRow>) -> Vec<Submission> {
    rows.into_iter()
        .filter_map(|row| match row.into_submission() {
            Ok(submission) => Some(submission),
            Err(e) => {
                tracing::warn!("Skipping stored submission: {}", e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl SubmissionStore for PostgresStore {
    async fn append(&self, submission: NewSubmission) -> Result<Submission, StoreError> {
        let query = format!(
            r#"
            INSERT INTO submissions (
                id, schema_version, user_name, contact_no, role,
                source_lat, source_lng, destination_lat, destination_lng,
                source_address, destination_address, vehicle_type, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(SUBMISSION_SCHEMA_VERSION as i16)
            .bind(&submission.user_name)
            .bind(&submission.contact_no)
            .bind(submission.role.as_str())
            .bind(submission.source.latitude)
            .bind(submission.source.longitude)
            .bind(submission.destination.latitude)
            .bind(submission.destination.longitude)
            .bind(&submission.source_address)
            .bind(&submission.destination_address)
            .bind(submission.vehicle_type.as_str())
            .fetch_one(&self.pool)
            .await?;

        let stored = SubmissionRow::from_pg(&row)?.into_submission()?;

        tracing::debug!("Stored {} submission {}", stored.role, stored.id);

        Ok(stored)
    }

    async fn query_recent_by_role(
        &self,
        role: Role,
        since: DateTime<Utc>,
    ) -> Result<Vec<Submission>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM submissions
            WHERE role = $1 AND created_at >= $2
            ORDER BY seq ASC
            "#,
            SUBMISSION_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(role.as_str())
            .bind(since)
            .fetch_all(&self.pool)
            .await?;

        let rows = rows
            .iter()
            .map(SubmissionRow::from_pg)
            .collect::<Result<Vec<_>, _>>()?;
        let submissions = parse_rows(rows);

        tracing::debug!("Found {} recent {} submissions since {}", submissions.len(), role, since);

        Ok(submissions)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
