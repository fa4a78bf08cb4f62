use crate::models::Coordinate;

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// Symmetric in its arguments and exactly zero for identical points. The
/// haversine term is clamped to [0, 1] so rounding near antipodal or
/// coincident points cannot push `sqrt` into NaN. NaN coordinates still
/// propagate NaN.
///
/// # Arguments
/// * `a` - First point in degrees
/// * `b` - Second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Check whether two points are within `radius_km` of each other
#[inline]
pub fn is_within_radius(a: Coordinate, b: Coordinate, radius_km: f64) -> bool {
    haversine_distance(a, b) <= radius_km
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris (approximately 344 km)
        let london = Coordinate::new(51.5074, -0.1278);
        let paris = Coordinate::new(48.8566, 2.3522);

        let distance = haversine_distance(london, paris);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let distance = haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        assert!((distance - 111.19).abs() / 111.19 < 0.005, "got {}", distance);
    }

    #[test]
    fn test_identical_points_are_zero() {
        let p = Coordinate::new(12.9716, 77.5946);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn test_antipodal_points() {
        let distance = haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!(!distance.is_nan());
        assert!((distance - half_circumference).abs() < 1e-6);
    }

    #[test]
    fn test_nan_propagates() {
        let distance = haversine_distance(Coordinate::new(f64::NAN, 0.0), Coordinate::new(0.0, 0.0));
        assert!(distance.is_nan());
    }

    #[test]
    fn test_within_radius() {
        let taker = Coordinate::new(12.90, 77.50);
        assert!(is_within_radius(taker, Coordinate::new(12.905, 77.505), 5.0));
        assert!(!is_within_radius(taker, Coordinate::new(12.95, 77.60), 5.0));
    }
}
