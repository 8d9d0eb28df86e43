//! Upstream time-series document (met.no Locationforecast 2.0 shape)
//!
//! Only the fields the fog forecast needs are modelled. Everything inside an
//! entry except its timestamp is optional so that a sparse entry degrades to
//! defaults instead of failing the whole document.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StructuralError;

/// Top-level forecast document as returned by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastDocument {
    pub properties: Option<DocumentProperties>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentProperties {
    pub meta: Option<DocumentMeta>,
    pub timeseries: Option<Vec<TimeseriesEntry>>,
}

/// Model run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub updated_at: Option<DateTime<Utc>>,
}

/// One forecast step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeseriesEntry {
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub data: EntryData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryData {
    #[serde(default)]
    pub instant: InstantData,
    #[serde(default, deserialize_with = "lenient")]
    pub next_1_hours: Option<PeriodForecast>,
    #[serde(default, deserialize_with = "lenient")]
    pub next_6_hours: Option<PeriodForecast>,
    #[serde(default, deserialize_with = "lenient")]
    pub next_12_hours: Option<PeriodForecast>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstantData {
    #[serde(default)]
    pub details: InstantDetails,
}

/// Instantaneous values, all percentages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstantDetails {
    #[serde(default, deserialize_with = "lenient")]
    pub fog_area_fraction: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub relative_humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub cloud_area_fraction: Option<f64>,
}

/// Lookahead window (1h, 6h or 12h)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodForecast {
    #[serde(default, deserialize_with = "lenient")]
    pub summary: Option<PeriodSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub symbol_code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub symbol_confidence: Option<String>,
}

/// Optional field whose value has the wrong type reads as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl ForecastDocument {
    /// Parse a raw JSON body. Shape errors become [`StructuralError::Malformed`].
    pub fn from_slice(body: &[u8]) -> Result<Self, StructuralError> {
        serde_json::from_slice(body).map_err(|e| StructuralError::Malformed(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, StructuralError> {
        serde_json::from_value(value).map_err(|e| StructuralError::Malformed(e.to_string()))
    }

    /// The time series, or the name of the missing field
    pub fn timeseries(&self) -> Result<&[TimeseriesEntry], StructuralError> {
        let properties = self
            .properties
            .as_ref()
            .ok_or(StructuralError::MissingField("properties"))?;
        let series = properties
            .timeseries
            .as_deref()
            .ok_or(StructuralError::MissingField("properties.timeseries"))?;
        if series.is_empty() {
            return Err(StructuralError::EmptySeries);
        }
        Ok(series)
    }

    pub fn model_run_at(&self) -> Option<DateTime<Utc>> {
        self.properties
            .as_ref()
            .and_then(|p| p.meta.as_ref())
            .and_then(|m| m.updated_at)
    }
}

impl PeriodForecast {
    pub fn symbol_code(&self) -> Option<&str> {
        self.summary.as_ref().and_then(|s| s.symbol_code.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_entry_parses() {
        let doc = ForecastDocument::from_value(serde_json::json!({
            "properties": {
                "timeseries": [
                    { "time": "2024-01-01T00:00:00Z", "data": { "instant": { "details": {} } } },
                    { "time": "2024-01-01T01:00:00Z" }
                ]
            }
        }))
        .unwrap();

        let series = doc.timeseries().unwrap();
        assert_eq!(series.len(), 2);
        assert!(series[1].data.instant.details.fog_area_fraction.is_none());
        assert!(series[1].data.next_1_hours.is_none());
    }

    #[test]
    fn test_wrongly_typed_fields_read_as_absent() {
        let doc = ForecastDocument::from_value(serde_json::json!({
            "properties": {
                "timeseries": [{
                    "time": "2024-01-01T00:00:00Z",
                    "data": {
                        "instant": { "details": {
                            "fog_area_fraction": 40.0,
                            "relative_humidity": "n/a",
                            "cloud_area_fraction": null
                        } },
                        "next_1_hours": { "summary": { "symbol_code": 3 } },
                        "next_6_hours": "unavailable",
                        "next_12_hours": { "summary": { "symbol_code": "fog" } }
                    }
                }]
            }
        }))
        .unwrap();

        let entry = &doc.timeseries().unwrap()[0];
        let details = &entry.data.instant.details;
        assert_eq!(details.fog_area_fraction, Some(40.0));
        assert_eq!(details.relative_humidity, None);
        assert_eq!(details.cloud_area_fraction, None);
        assert_eq!(entry.data.next_1_hours.as_ref().unwrap().symbol_code(), None);
        assert!(entry.data.next_6_hours.is_none());
        assert_eq!(entry.data.next_12_hours.as_ref().unwrap().symbol_code(), Some("fog"));
    }

    #[test]
    fn test_missing_timeseries_field() {
        let doc = ForecastDocument::from_value(serde_json::json!({ "properties": {} })).unwrap();
        assert!(matches!(
            doc.timeseries(),
            Err(StructuralError::MissingField("properties.timeseries"))
        ));

        let doc = ForecastDocument::from_value(serde_json::json!({ "type": "Feature" })).unwrap();
        assert!(matches!(doc.timeseries(), Err(StructuralError::MissingField("properties"))));
    }

    #[test]
    fn test_empty_timeseries() {
        let doc =
            ForecastDocument::from_value(serde_json::json!({ "properties": { "timeseries": [] } }))
                .unwrap();
        assert!(matches!(doc.timeseries(), Err(StructuralError::EmptySeries)));
    }

    #[test]
    fn test_invalid_time_is_malformed() {
        let result = ForecastDocument::from_slice(
            br#"{"properties":{"timeseries":[{"time":"yesterday"}]}}"#,
        );
        assert!(matches!(result, Err(StructuralError::Malformed(_))));
    }

    #[test]
    fn test_model_run_at() {
        let doc = ForecastDocument::from_value(serde_json::json!({
            "properties": {
                "meta": { "updated_at": "2024-01-01T00:12:30Z" },
                "timeseries": []
            }
        }))
        .unwrap();
        assert_eq!(doc.model_run_at().unwrap().to_rfc3339(), "2024-01-01T00:12:30+00:00");
    }
}
