use std::collections::HashMap;
use thiserror::Error;

use crate::core::distance::haversine_distance;
use crate::models::{Coordinate, RouteMetrics, VehicleType};

/// Errors from derived metric computation
///
/// These are deterministic; retrying with the same input gives the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("Invalid vehicle type: {0}")]
    InvalidVehicleType(String),
}

/// Per-kilometer rates for one vehicle type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleRate {
    /// Currency units per km
    pub cost_per_km: f64,
    /// kg of CO2 avoided per km shared
    pub co2_per_km: f64,
}

/// Rate lookup keyed by vehicle type
///
/// Bike is the cheapest and lowest-emission entry, sedan the highest.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: HashMap<VehicleType, VehicleRate>,
}

impl RateTable {
    pub fn new(rates: HashMap<VehicleType, VehicleRate>) -> Self {
        Self { rates }
    }

    pub fn rate(&self, vehicle: VehicleType) -> Result<VehicleRate, MetricsError> {
        self.rates
            .get(&vehicle)
            .copied()
            .ok_or_else(|| MetricsError::InvalidVehicleType(vehicle.to_string()))
    }

    /// Estimated fare for `distance_km` in `vehicle`
    #[inline]
    pub fn cost(&self, distance_km: f64, vehicle: VehicleType) -> Result<f64, MetricsError> {
        Ok(distance_km * self.rate(vehicle)?.cost_per_km)
    }

    /// CO2 avoided by sharing `distance_km` in `vehicle`
    #[inline]
    pub fn co2_avoided(&self, distance_km: f64, vehicle: VehicleType) -> Result<f64, MetricsError> {
        Ok(distance_km * self.rate(vehicle)?.co2_per_km)
    }

    /// Cost for a vehicle given by its wire name, e.g. `"car"`
    pub fn cost_for(&self, distance_km: f64, vehicle: &str) -> Result<f64, MetricsError> {
        self.cost(distance_km, vehicle.parse()?)
    }

    /// CO2 avoided for a vehicle given by its wire name
    pub fn co2_avoided_for(&self, distance_km: f64, vehicle: &str) -> Result<f64, MetricsError> {
        self.co2_avoided(distance_km, vehicle.parse()?)
    }

    /// Compute distance once for a route and derive both metrics from it
    pub fn route_metrics(
        &self,
        source: Coordinate,
        destination: Coordinate,
        vehicle: VehicleType,
    ) -> Result<RouteMetrics, MetricsError> {
        let rate = self.rate(vehicle)?;
        let distance_km = haversine_distance(source, destination);

        Ok(RouteMetrics {
            distance_km,
            estimated_cost: distance_km * rate.cost_per_km,
            co2_avoided_kg: distance_km * rate.co2_per_km,
        })
    }
}

impl Default for RateTable {
    fn default() -> Self {
        let rates = HashMap::from([
            (VehicleType::Bike, VehicleRate { cost_per_km: 5.0, co2_per_km: 0.05 }),
            (VehicleType::Car, VehicleRate { cost_per_km: 10.0, co2_per_km: 0.12 }),
            (VehicleType::Sedan, VehicleRate { cost_per_km: 15.0, co2_per_km: 0.18 }),
        ]);
        Self { rates }
    }
}
