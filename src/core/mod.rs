// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod metrics;

pub use distance::{haversine_distance, is_within_radius, EARTH_RADIUS_KM};
pub use filters::{is_eligible, EligibilityRules};
pub use matcher::{MatchEngine, MatchError, MatchSettings};
pub use metrics::{MetricsError, RateTable, VehicleRate};
