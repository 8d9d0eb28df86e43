//! Weather symbol selection and labelling

use crate::models::timeseries::TimeseriesEntry;

/// Qualifiers the provider appends to a symbol depending on daylight
const DAYLIGHT_SUFFIXES: [&str; 3] = ["_day", "_night", "_polartwilight"];

/// Pick the symbol for an entry from its lookahead windows.
///
/// The 1-hour window wins over the 6-hour window, which wins over the
/// 12-hour window. A window without a symbol code counts as absent.
pub fn resolve_symbol(entry: &TimeseriesEntry) -> Option<&str> {
    let data = &entry.data;
    [&data.next_1_hours, &data.next_6_hours, &data.next_12_hours]
        .into_iter()
        .flatten()
        .find_map(|period| period.symbol_code())
}

/// Same as [`resolve_symbol`] with the daylight qualifier removed
pub fn resolve_normalized_symbol(entry: &TimeseriesEntry) -> Option<String> {
    resolve_symbol(entry).map(|code| normalize_symbol(code).to_string())
}

/// Strip a trailing `_day` / `_night` / `_polartwilight` qualifier
pub fn normalize_symbol(code: &str) -> &str {
    DAYLIGHT_SUFFIXES
        .iter()
        .find_map(|suffix| code.strip_suffix(suffix))
        .unwrap_or(code)
}

/// Human readable description of a (normalized) symbol code
pub fn describe_symbol(code: &str) -> String {
    let text = match normalize_symbol(code) {
        "clearsky" => "Clear sky",
        "fair" => "Fair",
        "partlycloudy" => "Partly cloudy",
        "cloudy" => "Cloudy",
        "fog" => "Fog",
        "rainshowers" => "Rain showers",
        "rainshowersandthunder" => "Rain showers and thunder",
        "lightrainshowers" => "Light rain showers",
        "heavyrainshowers" => "Heavy rain showers",
        "lightrainshowersandthunder" => "Light rain showers and thunder",
        "heavyrainshowersandthunder" => "Heavy rain showers and thunder",
        "sleetshowers" => "Sleet showers",
        "lightsleetshowers" => "Light sleet showers",
        "heavysleetshowers" => "Heavy sleet showers",
        "sleetshowersandthunder" => "Sleet showers and thunder",
        "snowshowers" => "Snow showers",
        "lightsnowshowers" => "Light snow showers",
        "heavysnowshowers" => "Heavy snow showers",
        "snowshowersandthunder" => "Snow showers and thunder",
        "rain" => "Rain",
        "lightrain" => "Light rain",
        "heavyrain" => "Heavy rain",
        "rainandthunder" => "Rain and thunder",
        "lightrainandthunder" => "Light rain and thunder",
        "heavyrainandthunder" => "Heavy rain and thunder",
        "sleet" => "Sleet",
        "lightsleet" => "Light sleet",
        "heavysleet" => "Heavy sleet",
        "sleetandthunder" => "Sleet and thunder",
        "snow" => "Snow",
        "lightsnow" => "Light snow",
        "heavysnow" => "Heavy snow",
        "snowandthunder" => "Snow and thunder",
        other => return other.replace('_', " "),
    };
    text.to_string()
}
