use chrono::{DateTime, Utc};

use crate::core::distance::is_within_radius;
use crate::models::{Role, Submission};

/// Thresholds a provider has to meet to be paired with a taker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EligibilityRules {
    /// Max distance between the two pickup points, in km
    pub max_pickup_distance_km: f64,
    /// Require identical destination coordinates (exact float equality)
    pub require_same_destination: bool,
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self {
            max_pickup_distance_km: 5.0,
            require_same_destination: true,
        }
    }
}

/// Candidate is a provider submitted at or after `since`
#[inline]
pub fn is_recent_provider(candidate: &Submission, since: DateTime<Utc>) -> bool {
    candidate.role == Role::Provider && candidate.created_at >= since
}

/// Pickup points are within the proximity threshold
#[inline]
pub fn is_nearby_pickup(taker: &Submission, candidate: &Submission, rules: &EligibilityRules) -> bool {
    is_within_radius(taker.source, candidate.source, rules.max_pickup_distance_km)
}

/// Same vehicle type, no substitution
#[inline]
pub fn has_same_vehicle(taker: &Submission, candidate: &Submission) -> bool {
    taker.vehicle_type == candidate.vehicle_type
}

/// Destinations compare with `==` on both components, not a distance
/// threshold. Disabled rules always pass.
#[inline]
pub fn has_same_destination(taker: &Submission, candidate: &Submission, rules: &EligibilityRules) -> bool {
    !rules.require_same_destination || taker.destination == candidate.destination
}

/// Full eligibility predicate for a provider candidate
#[inline]
pub fn is_eligible(
    taker: &Submission,
    candidate: &Submission,
    since: DateTime<Utc>,
    rules: &EligibilityRules,
) -> bool {
    is_recent_provider(candidate, since)
        && has_same_vehicle(taker, candidate)
        && is_nearby_pickup(taker, candidate, rules)
        && has_same_destination(taker, candidate, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, NewSubmission, VehicleType};
    use chrono::Duration;
    use uuid::Uuid;

    fn submission(role: Role, source: Coordinate, destination: Coordinate, minutes_ago: i64) -> Submission {
        NewSubmission {
            user_name: "Test User".to_string(),
            contact_no: "9000000000".to_string(),
            role,
            source,
            destination,
            source_address: None,
            destination_address: None,
            vehicle_type: VehicleType::Car,
        }
        .into_submission(Uuid::new_v4(), Utc::now() - Duration::minutes(minutes_ago))
    }

    #[test]
    fn test_eligible_provider() {
        let taker = submission(Role::Taker, Coordinate::new(12.90, 77.50), Coordinate::new(12.95, 77.60), 0);
        let provider = submission(Role::Provider, Coordinate::new(12.905, 77.505), Coordinate::new(12.95, 77.60), 2);
        let since = taker.created_at - Duration::minutes(10);

        assert!(is_eligible(&taker, &provider, since, &EligibilityRules::default()));
    }

    #[test]
    fn test_taker_is_never_a_candidate() {
        let taker = submission(Role::Taker, Coordinate::new(12.90, 77.50), Coordinate::new(12.95, 77.60), 0);
        let other_taker = submission(Role::Taker, Coordinate::new(12.90, 77.50), Coordinate::new(12.95, 77.60), 1);
        let since = taker.created_at - Duration::minutes(10);

        assert!(!is_eligible(&taker, &other_taker, since, &EligibilityRules::default()));
    }

    #[test]
    fn test_destination_must_match_exactly() {
        let taker = submission(Role::Taker, Coordinate::new(12.90, 77.50), Coordinate::new(12.95, 77.60), 0);
        let provider = submission(Role::Provider, Coordinate::new(12.90, 77.50), Coordinate::new(12.95, 77.600001), 1);
        let rules = EligibilityRules::default();

        assert!(!has_same_destination(&taker, &provider, &rules));

        let relaxed = EligibilityRules { require_same_destination: false, ..rules };
        assert!(has_same_destination(&taker, &provider, &relaxed));
    }

    #[test]
    fn test_pickup_exactly_on_threshold_is_eligible() {
        let taker = submission(Role::Taker, Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0), 0);
        let provider = submission(Role::Provider, Coordinate::new(0.0, 0.03), Coordinate::new(1.0, 1.0), 0);
        let distance = crate::core::haversine_distance(taker.source, provider.source);
        let rules = EligibilityRules { max_pickup_distance_km: distance, ..Default::default() };

        assert!(is_nearby_pickup(&taker, &provider, &rules));
    }
}
