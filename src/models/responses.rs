use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::MatchView;

/// Response for the find-ride endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindRideResponse {
    pub matched: bool,
    pub message: String,
    #[serde(rename = "submissionId")]
    pub submission_id: Uuid,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub provider_match: Option<MatchView>,
}

/// Response for the provide-service endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvideServiceResponse {
    pub message: String,
    #[serde(rename = "submissionId")]
    pub submission_id: Uuid,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Plain message body, used for 404s on the match endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
