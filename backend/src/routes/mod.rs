//! Route definitions for the FogCast server

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create forecast routes
pub fn forecast_routes() -> Router<AppState> {
    Router::new()
        // Negotiated JSON / HTML
        .route("/", get(handlers::get_forecast))
        // Always JSON
        .route("/api", get(handlers::get_forecast_json))
        .route("/health", get(handlers::health_check))
}
