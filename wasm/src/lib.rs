//! WebAssembly module for FogCast
//!
//! Provides client-side helpers for:
//! - Fog status labels
//! - Weather symbol normalization and descriptions
//! - Summaries of a fetched forecast snapshot

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("fogcast wasm helpers loaded"));
}

/// Status label for a fog area fraction, e.g. "Light fog"
#[wasm_bindgen]
pub fn classify_fog_status(fog_area_fraction: f64) -> String {
    let fraction = clamp_fog_fraction(Some(fog_area_fraction));
    classify_fog(fraction).label().to_string()
}

/// Strip the day/night qualifier from a symbol code
#[wasm_bindgen]
pub fn normalize_symbol(code: &str) -> String {
    shared::normalize_symbol(code).to_string()
}

/// Human-readable text for a symbol code
#[wasm_bindgen]
pub fn describe_symbol(code: &str) -> String {
    shared::describe_symbol(code)
}

/// Whether a fog fraction still allows a clear view
#[wasm_bindgen]
pub fn is_good_viewing(fog_area_fraction: f64) -> bool {
    classify_fog(clamp_fog_fraction(Some(fog_area_fraction))).is_good_viewing()
}

fn summary_line(snapshot: &ForecastSnapshot) -> String {
    format!(
        "{}: {} ({}% fog) at {}",
        snapshot.location,
        snapshot.current.status,
        snapshot.current.fog_area_fraction,
        snapshot.local_clock(snapshot.current.time)
    )
}

/// One-line summary of a snapshot returned by the JSON API
#[wasm_bindgen]
pub fn summarize_snapshot(snapshot_json: &str) -> Result<String, JsValue> {
    let snapshot: ForecastSnapshot = serde_json::from_str(snapshot_json).map_err(|e| {
        web_sys::console::warn_1(&JsValue::from_str(&format!("Invalid snapshot: {}", e)));
        JsValue::from_str(&format!("Invalid snapshot JSON: {}", e))
    })?;
    Ok(summary_line(&snapshot))
}

/// Local clock labels of the hourly entries with at most `max_fraction` fog
#[wasm_bindgen]
pub fn clear_viewing_times(snapshot_json: &str, max_fraction: f64) -> Result<js_sys::Array, JsValue> {
    let snapshot: ForecastSnapshot = serde_json::from_str(snapshot_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid snapshot JSON: {}", e)))?;

    Ok(snapshot
        .clear_hours(max_fraction)
        .map(|h| JsValue::from_str(&snapshot.local_clock(h.time)))
        .collect())
}
