//! Fog severity models

use serde::{Deserialize, Serialize};

/// Fog severity derived from the fog area fraction (percent)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum FogStatus {
    /// No fog reported
    #[default]
    #[serde(rename = "Clear")]
    Clear,
    /// Above 0 and below 25 percent
    #[serde(rename = "Patches of fog")]
    PatchesOfFog,
    /// 25 to below 50 percent
    #[serde(rename = "Light fog")]
    LightFog,
    /// 50 to below 75 percent
    #[serde(rename = "Moderate fog")]
    ModerateFog,
    /// 75 percent and above
    #[serde(rename = "Heavy fog")]
    HeavyFog,
}

impl FogStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FogStatus::Clear => "Clear",
            FogStatus::PatchesOfFog => "Patches of fog",
            FogStatus::LightFog => "Light fog",
            FogStatus::ModerateFog => "Moderate fog",
            FogStatus::HeavyFog => "Heavy fog",
        }
    }

    /// Whether the bridge is likely visible (under 25% coverage)
    pub fn is_good_viewing(&self) -> bool {
        matches!(self, FogStatus::Clear | FogStatus::PatchesOfFog)
    }
}

impl std::fmt::Display for FogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify fog severity from a fog area fraction.
///
/// Thresholds are inclusive lower bounds. The input is not range checked;
/// callers clamp it first (see [`crate::validation::clamp_fog_fraction`]).
/// NaN falls through every comparison and classifies as `Clear`.
pub fn classify_fog(fog_area_fraction: f64) -> FogStatus {
    if fog_area_fraction >= 75.0 {
        FogStatus::HeavyFog
    } else if fog_area_fraction >= 50.0 {
        FogStatus::ModerateFog
    } else if fog_area_fraction >= 25.0 {
        FogStatus::LightFog
    } else if fog_area_fraction > 0.0 {
        FogStatus::PatchesOfFog
    } else {
        FogStatus::Clear
    }
}
