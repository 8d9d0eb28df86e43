//! Validation utilities for fog forecast data

// ============================================================================
// Measurement Values
// ============================================================================

/// Clamp a fog area fraction into [0, 100], treating absent or NaN as 0
pub fn clamp_fog_fraction(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_nan() => 0.0,
        Some(v) => v.clamp(0.0, 100.0),
        None => 0.0,
    }
}

// ============================================================================
// Location Validations
// ============================================================================

/// Validate GPS coordinates
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), &'static str> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a civil UTC offset in whole hours
pub fn validate_utc_offset(hours: i32) -> Result<(), &'static str> {
    if !(-12..=14).contains(&hours) {
        return Err("UTC offset must be between -12 and 14 hours");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_fog_fraction() {
        assert_eq!(clamp_fog_fraction(None), 0.0);
        assert_eq!(clamp_fog_fraction(Some(-3.0)), 0.0);
        assert_eq!(clamp_fog_fraction(Some(42.5)), 42.5);
        assert_eq!(clamp_fog_fraction(Some(130.0)), 100.0);
        assert_eq!(clamp_fog_fraction(Some(f64::NAN)), 0.0);
    }

    #[test]
    fn test_golden_gate_coordinates_valid() {
        assert!(validate_coordinates(37.80734, -122.47477).is_ok());
    }

    #[test]
    fn test_coordinates_out_of_range() {
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
    }

    #[test]
    fn test_validate_utc_offset() {
        assert!(validate_utc_offset(-7).is_ok());
        assert!(validate_utc_offset(14).is_ok());
        assert!(validate_utc_offset(-13).is_err());
    }
}
