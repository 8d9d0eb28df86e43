//! HTML rendering of forecast snapshots

use std::fmt::Write;

use chrono::Duration;
use serde_json::json;
use shared::{describe_symbol, ForecastSnapshot};

use crate::error::ErrorDetail;

const STYLE: &str = r#"
        body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; line-height: 1.6; color: #333; background: #f7f9fb; }
        header { text-align: center; margin-bottom: 30px; }
        h1 { color: #2c3e50; margin-bottom: 0; }
        h2 { color: #7f8c8d; font-weight: normal; margin-top: 5px; }
        .coordinates, .updated { color: #95a5a6; font-size: 0.9em; }
        section { background: white; border-radius: 8px; padding: 20px; margin-bottom: 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.05); }
        .current .status { font-size: 2em; font-weight: bold; color: #2980b9; }
        .highlight { font-weight: bold; color: #e67e22; }
        .forecast-item { padding: 8px 0; border-bottom: 1px solid #ecf0f1; }
        .forecast-item:last-child { border-bottom: none; }
        .extended-forecast { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 12px; }
        .day-forecast { border: 1px solid #ecf0f1; border-radius: 6px; padding: 10px; }
        .day-forecast h4 { margin: 0 0 6px 0; }
        .period-label { color: #7f8c8d; }
        footer { text-align: center; color: #95a5a6; }
"#;

/// Escape text for interpolation into HTML content or attribute values
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}%", v),
        None => "n/a".to_string(),
    }
}

/// schema.org `WeatherForecast` block for the page head
pub fn structured_data(snapshot: &ForecastSnapshot) -> serde_json::Value {
    json!({
        "@context": "https://schema.org",
        "@type": "WeatherForecast",
        "name": format!("{} Fog Forecast", snapshot.location),
        "description": format!("Fog forecast for {}", snapshot.location),
        "location": {
            "@type": "Place",
            "name": snapshot.location,
            "geo": {
                "@type": "GeoCoordinates",
                "latitude": snapshot.coordinates.latitude,
                "longitude": snapshot.coordinates.longitude,
            },
        },
        "dateModified": snapshot.updated_at,
        "provider": {
            "@type": "Organization",
            "name": "Yr.no",
            "url": "https://yr.no",
        },
        "mainEntity": {
            "@type": "WeatherObservation",
            "observationDate": snapshot.updated_at,
            "measuredValue": [
                {
                    "@type": "QuantitativeValue",
                    "name": "Fog Coverage",
                    "value": snapshot.current.fog_area_fraction,
                    "unitText": "percent",
                },
                {
                    "@type": "QuantitativeValue",
                    "name": "Relative Humidity",
                    "value": snapshot.current.relative_humidity,
                    "unitText": "percent",
                },
            ],
        },
    })
}

/// Full forecast page
pub fn forecast_page(snapshot: &ForecastSnapshot) -> String {
    let location = escape_html(&snapshot.location);
    let status = escape_html(snapshot.current.status.label());
    let fog = snapshot.current.fog_area_fraction;
    let lat = snapshot.coordinates.latitude;
    let lon = snapshot.coordinates.longitude;
    // "</" would close the script element early
    let ld_json = serde_json::to_string_pretty(&structured_data(snapshot))
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");

    let mut html = String::with_capacity(8 * 1024);
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Fog Forecast {location} | Current: {status}</title>
    <meta name="description" content="Real-time fog forecast for {location}. Current conditions: {status} ({fog}% fog coverage).">
    <meta name="robots" content="index, follow">
    <meta property="og:type" content="website">
    <meta property="og:title" content="Fog Forecast | Current: {status}">
    <meta property="og:description" content="Current: {status} with {fog}% fog coverage.">
    <meta property="og:site_name" content="FogCast">
    <meta name="geo.position" content="{lat};{lon}">
    <meta name="ICBM" content="{lat}, {lon}">
    <script type="application/ld+json">
{ld_json}
    </script>
    <style>{STYLE}</style>
</head>
<body>
    <header>
        <h1>Fog Forecast</h1>
        <h2>{location}</h2>
        <p class="coordinates">Coordinates: {lat}, {lon}</p>
        <p class="updated"><strong>Last Updated:</strong> {updated}</p>
    </header>
    <main>
        <section class="current">
            <h3>Current Fog Conditions</h3>
            <div class="status">{status}</div>
            <p><strong>Fog Coverage:</strong> <span class="highlight">{fog}%</span></p>
            <p><strong>Relative Humidity:</strong> {humidity}</p>
            <p><strong>Cloud Coverage:</strong> {cloud}</p>
        </section>
"#,
        updated = snapshot.updated_at.to_rfc3339(),
        humidity = percent(snapshot.current.relative_humidity),
        cloud = percent(snapshot.current.cloud_area_fraction),
    );

    render_hourly(&mut html, snapshot);
    render_days(&mut html, snapshot);

    html.push_str(
        r#"        <section class="api-link">
            <h3>Developer API Access</h3>
            <p><strong>JSON:</strong> <a href="?format=json">?format=json</a></p>
            <p><strong>REST Endpoint:</strong> <a href="/api">/api</a></p>
        </section>
    </main>
    <footer>
        <p><small>Weather data provided by <a href="https://yr.no" rel="noopener" target="_blank">Yr.no</a> (Norwegian Meteorological Institute)</small></p>
    </footer>
</body>
</html>
"#,
    );

    html
}

fn render_hourly(html: &mut String, snapshot: &ForecastSnapshot) {
    let _ = write!(
        html,
        "        <section>\n            <h3>{}-Hour Fog Forecast</h3>\n",
        snapshot.hourly.len()
    );
    for hour in &snapshot.hourly {
        let _ = write!(
            html,
            r#"            <article class="forecast-item">
                <strong>{}</strong> - {}
                <br>Fog: {}% | Humidity: {}
            </article>
"#,
            escape_html(&snapshot.local_clock(hour.time)),
            escape_html(hour.status.label()),
            hour.fog_area_fraction,
            percent(hour.relative_humidity),
        );
    }
    html.push_str("        </section>\n");
}

fn render_days(html: &mut String, snapshot: &ForecastSnapshot) {
    let _ = write!(
        html,
        "        <section>\n            <h3>Extended Forecast (Next {} Days)</h3>\n            <div class=\"extended-forecast\">\n",
        snapshot.days.len()
    );

    let offset = snapshot.local_offset();
    for (day, bucket) in &snapshot.days {
        let date = (snapshot.updated_at + Duration::days(i64::from(*day)))
            .with_timezone(&offset)
            .format("%a, %b %-d");
        let _ = write!(
            html,
            "                <div class=\"day-forecast\">\n                    <h4>Day {} - {}</h4>\n",
            day, date
        );
        for (period, symbol) in bucket.periods() {
            let _ = writeln!(
                html,
                r#"                    <div class="period"><span class="period-label">{}:</span> <span class="weather-symbol">{}</span></div>"#,
                period.label(),
                escape_html(&describe_symbol(symbol)),
            );
        }
        html.push_str("                </div>\n");
    }

    html.push_str("            </div>\n        </section>\n");
}

/// Page shown to browsers when the forecast cannot be produced
pub fn error_page(detail: &ErrorDetail) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Fog Forecast - Error</title>
</head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 50px auto; padding: 20px;">
    <h1>Fog Forecast</h1>
    <h2>Service Temporarily Unavailable</h2>
    <p>We're having trouble retrieving the fog forecast.</p>
    <p><strong>Error:</strong> {message}</p>
    <p><small>{code} at {timestamp}</small></p>
    <p>Please try again in a few moments.</p>
</body>
</html>
"#,
        message = escape_html(&detail.message),
        code = escape_html(&detail.code),
        timestamp = detail.timestamp.to_rfc3339(),
    )
}
