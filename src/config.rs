use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::core::{EligibilityRules, MatchSettings, RateTable, VehicleRate};
use crate::models::VehicleType;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub pricing: PricingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_url: None,
            max_connections: None,
            min_connections: None,
            acquire_timeout_secs: None,
        }
    }
}

fn default_backend() -> StoreBackend { StoreBackend::Memory }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_window_minutes")]
    pub window_minutes: i64,
    #[serde(default = "default_max_pickup_distance_km")]
    pub max_pickup_distance_km: f64,
    #[serde(default = "default_true")]
    pub require_same_destination: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            window_minutes: default_window_minutes(),
            max_pickup_distance_km: default_max_pickup_distance_km(),
            require_same_destination: default_true(),
        }
    }
}

impl From<&MatchingSettings> for MatchSettings {
    fn from(value: &MatchingSettings) -> Self {
        MatchSettings {
            window: chrono::Duration::minutes(value.window_minutes),
            rules: EligibilityRules {
                max_pickup_distance_km: value.max_pickup_distance_km,
                require_same_destination: value.require_same_destination,
            },
        }
    }
}

fn default_window_minutes() -> i64 { 10 }
fn default_max_pickup_distance_km() -> f64 { 5.0 }
fn default_true() -> bool { true }

/// Per-km rates, one entry per vehicle type
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateConfig {
    pub cost_per_km: f64,
    pub co2_per_km: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingSettings {
    #[serde(default = "default_bike_rate")]
    pub bike: RateConfig,
    #[serde(default = "default_car_rate")]
    pub car: RateConfig,
    #[serde(default = "default_sedan_rate")]
    pub sedan: RateConfig,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            bike: default_bike_rate(),
            car: default_car_rate(),
            sedan: default_sedan_rate(),
        }
    }
}

fn default_bike_rate() -> RateConfig { RateConfig { cost_per_km: 5.0, co2_per_km: 0.05 } }
fn default_car_rate() -> RateConfig { RateConfig { cost_per_km: 10.0, co2_per_km: 0.12 } }
fn default_sedan_rate() -> RateConfig { RateConfig { cost_per_km: 15.0, co2_per_km: 0.18 } }

impl PricingSettings {
    pub fn rate_table(&self) -> RateTable {
        let rate = |r: &RateConfig| VehicleRate {
            cost_per_km: r.cost_per_km,
            co2_per_km: r.co2_per_km,
        };

        RateTable::new(HashMap::from([
            (VehicleType::Bike, rate(&self.bike)),
            (VehicleType::Car, rate(&self.car)),
            (VehicleType::Sedan, rate(&self.sedan)),
        ]))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Plain,
}

impl LoggingSettings {
    /// `json` and `pretty` select those formatters; anything else is plain text
    pub fn log_format(&self) -> LogFormat {
        match self.format.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Plain,
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CARPOOL__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CARPOOL__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CARPOOL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_database_url(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CARPOOL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// `DATABASE_URL` wins over `store.database_url`, matching sqlx tooling
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("store.database_url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matching() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.window_minutes, 10);
        assert_eq!(matching.max_pickup_distance_km, 5.0);
        assert!(matching.require_same_destination);

        let settings = MatchSettings::from(&matching);
        assert_eq!(settings, MatchSettings::default());
    }

    #[test]
    fn test_default_pricing_matches_rate_table() {
        assert_eq!(PricingSettings::default().rate_table(), RateTable::default());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
        assert_eq!(LoggingSettings::default().log_format(), LogFormat::Json);
    }

    #[test]
    fn test_log_format_selection() {
        let with = |format: &str| LoggingSettings {
            level: "debug".to_string(),
            format: format.to_string(),
        };
        assert_eq!(with("Pretty").log_format(), LogFormat::Pretty);
        assert_eq!(with("compact").log_format(), LogFormat::Plain);
        assert_eq!(with(" json ").log_format(), LogFormat::Json);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("carpool-config-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
            [server]
            port = 8088

            [matching]
            window_minutes = 15
            require_same_destination = false

            [pricing.car]
            cost_per_km = 12.5
            co2_per_km = 0.2
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 8088);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.store.backend, StoreBackend::Memory);
        assert_eq!(settings.matching.window_minutes, 15);
        assert!(!settings.matching.require_same_destination);

        let rates = settings.pricing.rate_table();
        assert_eq!(rates.cost(2.0, VehicleType::Car).unwrap(), 25.0);
        assert_eq!(rates.cost(2.0, VehicleType::Bike).unwrap(), 10.0);
    }
}
