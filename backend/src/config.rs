//! Configuration management for the FogCast server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FOGCAST_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{
    validate_coordinates, validate_utc_offset, AggregationOptions, ForecastLocation,
    GpsCoordinates,
};
use validator::{Validate, ValidationError};

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    #[validate]
    pub server: ServerConfig,

    /// The fixed point the forecast is produced for
    #[validate]
    pub location: LocationConfig,

    /// Weather provider configuration
    #[validate]
    pub upstream: UpstreamConfig,

    /// Forecast cache configuration
    #[validate]
    pub cache: CacheConfig,

    /// Aggregation presentation settings
    #[validate]
    pub forecast: ForecastConfig,

    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ServerConfig {
    /// Server port
    #[validate(range(min = 1))]
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
#[validate(schema(function = "validate_location"))]
pub struct LocationConfig {
    /// Display name of the location
    #[validate(length(min = 1))]
    pub name: String,

    pub latitude: f64,

    pub longitude: f64,

    /// Civil UTC offset used for morning/afternoon/night. Fixed, not DST aware.
    pub local_utc_offset_hours: i32,
}

fn validate_location(location: &LocationConfig) -> Result<(), ValidationError> {
    let check = validate_coordinates(location.latitude, location.longitude)
        .and_then(|_| validate_utc_offset(location.local_utc_offset_hours));
    check.map_err(|msg| {
        let mut error = ValidationError::new("location");
        error.message = Some(msg.into());
        error
    })
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct UpstreamConfig {
    /// Locationforecast endpoint
    #[validate(url)]
    pub base_url: String,

    /// Identifying User-Agent, required by the provider
    #[validate(length(min = 1))]
    pub user_agent: String,

    /// Request timeout in seconds
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

/// TTLs are capped at one week
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct CacheConfig {
    /// Expiry for new data when the provider sends no Expires header
    #[validate(range(min = 1, max = 604800))]
    pub default_ttl_secs: i64,

    /// Expiry extension for not-modified responses without Expires
    #[validate(range(min = 1, max = 604800))]
    pub revalidation_ttl_secs: i64,

    /// Serve an expired entry when the provider cannot be reached
    pub serve_stale_on_error: bool,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ForecastConfig {
    /// Number of leading entries in the hourly forecast
    #[validate(range(min = 1))]
    pub hourly_limit: usize,

    /// Whether the current entry is also hourly[0]
    pub include_current_in_hourly: bool,

    /// Last day offset of the extended forecast
    #[validate(range(min = 1))]
    pub max_day_offset: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogConfig {
    /// Emit JSON log lines
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FOGCAST_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default(
                "location.name",
                "Golden Gate Bridge Vista Point South, San Francisco",
            )?
            .set_default("location.latitude", 37.80734)?
            .set_default("location.longitude", -122.47477)?
            .set_default("location.local_utc_offset_hours", -7)?
            .set_default(
                "upstream.base_url",
                "https://api.met.no/weatherapi/locationforecast/2.0/complete",
            )?
            .set_default(
                "upstream.user_agent",
                "fogcast/1.0 (https://github.com/gain9999/fogcast)",
            )?
            .set_default("upstream.timeout_secs", 10)?
            .set_default("cache.default_ttl_secs", 3600)?
            .set_default("cache.revalidation_ttl_secs", 1800)?
            .set_default("cache.serve_stale_on_error", true)?
            .set_default("forecast.hourly_limit", 24)?
            .set_default("forecast.include_current_in_hourly", true)?
            .set_default("forecast.max_day_offset", 8)?
            .set_default("log.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FOGCAST_ prefix)
            .add_source(
                Environment::with_prefix("FOGCAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid configuration: {}", e)))?;
        Ok(config)
    }

    pub fn forecast_location(&self) -> ForecastLocation {
        ForecastLocation::new(
            self.location.name.clone(),
            GpsCoordinates::new(self.location.latitude, self.location.longitude),
        )
    }

    pub fn aggregation_options(&self) -> AggregationOptions {
        AggregationOptions {
            hourly_limit: self.forecast.hourly_limit,
            include_current_in_hourly: self.forecast.include_current_in_hourly,
            local_utc_offset_hours: self.location.local_utc_offset_hours,
            max_day_offset: self.forecast.max_day_offset,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 3600,
            revalidation_ttl_secs: 1800,
            serve_stale_on_error: true,
        }
    }
}
