//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Stable cache key, 4 decimals like the provider request
    pub fn cache_key(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// The fixed point a forecast is produced for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastLocation {
    pub name: String,
    pub coordinates: GpsCoordinates,
}

impl ForecastLocation {
    pub fn new(name: impl Into<String>, coordinates: GpsCoordinates) -> Self {
        Self {
            name: name.into(),
            coordinates,
        }
    }
}
