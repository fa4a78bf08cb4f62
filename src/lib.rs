//! Carpool Match - ride-sharing submission and matching service
//!
//! Takers and providers submit ride requests; each taker submission is paired
//! with the first recent, nearby provider using the same vehicle and heading
//! to the same destination. Successful matches carry the route distance, an
//! estimated cost and the CO2 avoided.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchEngine, MatchSettings, RateTable, distance::haversine_distance};
pub use crate::models::{Coordinate, Role, VehicleType, Submission, NewSubmission, MatchView, MatchOutcome, SubmissionRequest};
pub use crate::services::{CarpoolService, LatestMatchCache, SubmissionStore, InMemoryStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let p = Coordinate::new(12.9716, 77.5946);
        assert_eq!(haversine_distance(p, p), 0.0);
        assert!(RateTable::default().cost(1.0, VehicleType::Bike).is_ok());
    }
}
