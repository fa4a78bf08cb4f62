use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::core::metrics::MetricsError;

/// Current submission record version (records carrying address strings)
pub const SUBMISSION_SCHEMA_VERSION: u16 = 2;

/// Geographic point in degrees
///
/// No range checks here; requests are validated before they reach the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Which side of a ride a submission is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Taker,
    Provider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Taker => "taker",
            Role::Provider => "provider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "taker" => Ok(Role::Taker),
            "provider" => Ok(Role::Provider),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Bike,
    Car,
    Sedan,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [VehicleType::Bike, VehicleType::Car, VehicleType::Sedan];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Bike => "bike",
            VehicleType::Car => "car",
            VehicleType::Sedan => "sedan",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bike" => Ok(VehicleType::Bike),
            "car" => Ok(VehicleType::Car),
            "sedan" => Ok(VehicleType::Sedan),
            _ => Err(MetricsError::InvalidVehicleType(s.to_string())),
        }
    }
}

/// A validated submission that has not been persisted yet
///
/// The store assigns `id` and `created_at` when it is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub user_name: String,
    pub contact_no: String,
    pub role: Role,
    pub source: Coordinate,
    pub destination: Coordinate,
    pub source_address: Option<String>,
    pub destination_address: Option<String>,
    pub vehicle_type: VehicleType,
}

impl NewSubmission {
    /// Stamp the submission as persisted
    pub fn into_submission(self, id: Uuid, created_at: DateTime<Utc>) -> Submission {
        Submission {
            id,
            schema_version: SUBMISSION_SCHEMA_VERSION,
            user_name: self.user_name,
            contact_no: self.contact_no,
            role: self.role,
            source: self.source,
            destination: self.destination,
            source_address: self.source_address,
            destination_address: self.destination_address,
            vehicle_type: self.vehicle_type,
            created_at,
        }
    }
}

/// A persisted taker or provider request. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    #[serde(rename = "schemaVersion")]
    pub schema_version: u16,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "contactNo")]
    pub contact_no: String,
    pub role: Role,
    pub source: Coordinate,
    pub destination: Coordinate,
    #[serde(rename = "sourceAddress", default)]
    pub source_address: Option<String>,
    #[serde(rename = "destinationAddress", default)]
    pub destination_address: Option<String>,
    #[serde(rename = "vehicleType")]
    pub vehicle_type: VehicleType,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Distance and the figures derived from it for one route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "estimatedCost")]
    pub estimated_cost: f64,
    #[serde(rename = "co2AvoidedKg")]
    pub co2_avoided_kg: f64,
}

/// One side of a successful pairing, as shown to the other side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchView {
    #[serde(rename = "matchId")]
    pub match_id: Uuid,
    #[serde(rename = "submissionId")]
    pub submission_id: Uuid,
    pub role: Role,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "contactNo")]
    pub contact_no: String,
    pub source: Coordinate,
    pub destination: Coordinate,
    #[serde(rename = "sourceAddress")]
    pub source_address: Option<String>,
    #[serde(rename = "destinationAddress")]
    pub destination_address: Option<String>,
    #[serde(rename = "vehicleType")]
    pub vehicle_type: VehicleType,
    #[serde(rename = "submittedAt")]
    pub submitted_at: DateTime<Utc>,
    #[serde(rename = "matchedAt")]
    pub matched_at: DateTime<Utc>,
    #[serde(flatten)]
    pub metrics: RouteMetrics,
}

impl MatchView {
    pub fn from_submission(
        match_id: Uuid,
        submission: &Submission,
        metrics: RouteMetrics,
        matched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            match_id,
            submission_id: submission.id,
            role: submission.role,
            user_name: submission.user_name.clone(),
            contact_no: submission.contact_no.clone(),
            source: submission.source,
            destination: submission.destination,
            source_address: submission.source_address.clone(),
            destination_address: submission.destination_address.clone(),
            vehicle_type: submission.vehicle_type,
            submitted_at: submission.created_at,
            matched_at,
            metrics,
        }
    }
}

/// Both views of the most recent match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPair {
    pub taker: MatchView,
    pub provider: MatchView,
}

/// Result of a match attempt. `NotFound` is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched(Submission),
    NotFound,
}

impl MatchOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }
}
