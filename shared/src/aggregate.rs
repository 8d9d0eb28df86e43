//! Aggregation of a raw time series into a [`ForecastSnapshot`]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StructuralError;
use crate::models::{
    classify_fog, resolve_normalized_symbol, resolve_symbol, CurrentConditions, DayBucket,
    DayPartBucketer, ForecastDocument, ForecastSnapshot, NormalizedHour, TimeseriesEntry,
};
use crate::types::ForecastLocation;
use crate::validation::{clamp_fog_fraction, validate_utc_offset};

pub const DEFAULT_HOURLY_LIMIT: usize = 24;
pub const DEFAULT_MAX_DAY_OFFSET: u32 = 8;

/// Presentation choices for the aggregated forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationOptions {
    /// Number of leading entries considered for the hourly list
    pub hourly_limit: usize,
    /// Whether the current entry also appears as `hourly[0]`.
    /// When false the list starts at the second entry with `hours_ahead = 1`.
    pub include_current_in_hourly: bool,
    /// Civil offset of the location used for morning/afternoon/night
    pub local_utc_offset_hours: i32,
    /// Last day offset kept in the day buckets
    pub max_day_offset: u32,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            hourly_limit: DEFAULT_HOURLY_LIMIT,
            include_current_in_hourly: true,
            local_utc_offset_hours: 0,
            max_day_offset: DEFAULT_MAX_DAY_OFFSET,
        }
    }
}

/// Turns provider documents into snapshots for one configured location
#[derive(Debug, Clone)]
pub struct ForecastAggregator {
    options: AggregationOptions,
    bucketer: DayPartBucketer,
}

impl ForecastAggregator {
    pub fn new(options: AggregationOptions) -> Result<Self, &'static str> {
        validate_utc_offset(options.local_utc_offset_hours)?;
        let bucketer =
            DayPartBucketer::new(options.local_utc_offset_hours, options.max_day_offset.into())
                .ok_or("UTC offset is not representable")?;
        Ok(Self { options, bucketer })
    }

    /// Build the snapshot for `location` from a provider document.
    ///
    /// Fails only when the time series is missing or empty. Sparse entries
    /// degrade to defaults.
    pub fn aggregate(
        &self,
        document: &ForecastDocument,
        location: &ForecastLocation,
    ) -> Result<ForecastSnapshot, StructuralError> {
        let series = document.timeseries()?;
        let first = &series[0];

        Ok(ForecastSnapshot {
            location: location.name.clone(),
            coordinates: location.coordinates,
            updated_at: first.time,
            model_run_at: document.model_run_at(),
            local_utc_offset_hours: self.options.local_utc_offset_hours,
            current: current_conditions(first),
            hourly: self.hourly(series),
            days: self.day_buckets(series),
        })
    }

    fn hourly(&self, series: &[TimeseriesEntry]) -> Vec<NormalizedHour> {
        let skip = usize::from(!self.options.include_current_in_hourly);
        series
            .iter()
            .take(self.options.hourly_limit)
            .enumerate()
            .skip(skip)
            .map(|(index, entry)| normalize_hour(entry, index as u32))
            .collect()
    }

    /// First symbol seen per (day, period) in series order wins
    fn day_buckets(&self, series: &[TimeseriesEntry]) -> BTreeMap<u32, DayBucket> {
        let reference_start = series[0].time;
        let mut days: BTreeMap<u32, DayBucket> = BTreeMap::new();

        for entry in series {
            let Some(part) = self.bucketer.bucket_in_range(entry.time, reference_start) else {
                continue;
            };
            let Some(symbol) = resolve_normalized_symbol(entry) else {
                continue;
            };
            // range checked above, always 1..=max_day_offset
            let day = part.day_offset as u32;
            days.entry(day).or_default().fill(part.period, symbol);
        }

        days
    }
}

fn current_conditions(entry: &TimeseriesEntry) -> CurrentConditions {
    let details = &entry.data.instant.details;
    let fog_area_fraction = clamp_fog_fraction(details.fog_area_fraction);
    CurrentConditions {
        time: entry.time,
        fog_area_fraction,
        relative_humidity: details.relative_humidity,
        cloud_area_fraction: details.cloud_area_fraction,
        status: classify_fog(fog_area_fraction),
        symbol_code: resolve_symbol(entry).map(str::to_string),
    }
}

/// Normalize one entry into an hourly record
pub fn normalize_hour(entry: &TimeseriesEntry, hours_ahead: u32) -> NormalizedHour {
    let details = &entry.data.instant.details;
    let fog_area_fraction = clamp_fog_fraction(details.fog_area_fraction);
    NormalizedHour {
        time: entry.time,
        hours_ahead,
        fog_area_fraction,
        relative_humidity: details.relative_humidity,
        cloud_area_fraction: details.cloud_area_fraction,
        status: classify_fog(fog_area_fraction),
        symbol_code: resolve_symbol(entry).map(str::to_string),
    }
}
