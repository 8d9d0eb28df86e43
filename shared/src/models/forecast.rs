//! Display-ready fog forecast models

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::models::day_part::DayBucket;
use crate::models::fog::FogStatus;
use crate::types::GpsCoordinates;

/// One normalized hourly record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedHour {
    pub time: DateTime<Utc>,
    pub hours_ahead: u32,
    /// Clamped to [0, 100]; 0 when the provider omitted it
    pub fog_area_fraction: f64,
    pub relative_humidity: Option<f64>,
    pub cloud_area_fraction: Option<f64>,
    pub status: FogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_code: Option<String>,
}

/// Conditions at the first entry of the series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentConditions {
    pub time: DateTime<Utc>,
    pub fog_area_fraction: f64,
    pub relative_humidity: Option<f64>,
    pub cloud_area_fraction: Option<f64>,
    pub status: FogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_code: Option<String>,
}

/// Aggregated forecast for one location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastSnapshot {
    pub location: String,
    pub coordinates: GpsCoordinates,
    /// Timestamp of the first entry, i.e. freshness of the data
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_run_at: Option<DateTime<Utc>>,
    pub local_utc_offset_hours: i32,
    pub current: CurrentConditions,
    pub hourly: Vec<NormalizedHour>,
    /// Keyed by day offset (1..=8), ascending
    pub days: BTreeMap<u32, DayBucket>,
}

impl ForecastSnapshot {
    /// Civil offset the snapshot was bucketed with
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.local_utc_offset_hours.saturating_mul(3600))
            .unwrap_or_else(|| Utc.fix())
    }

    /// Format a timestamp as local wall-clock time, e.g. "2:00 PM"
    pub fn local_clock(&self, time: DateTime<Utc>) -> String {
        time.with_timezone(&self.local_offset())
            .format("%-I:%M %p")
            .to_string()
    }

    /// Hourly records with at most `max_fraction` fog coverage
    pub fn clear_hours(&self, max_fraction: f64) -> impl Iterator<Item = &NormalizedHour> {
        self.hourly
            .iter()
            .filter(move |h| h.fog_area_fraction <= max_fraction)
    }
}
