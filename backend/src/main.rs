//! FogCast - Backend Server
//!
//! Fog forecast for the Golden Gate Bridge Vista Point, served as JSON and HTML.

use std::{net::SocketAddr, sync::Arc};

use fogcast_backend::{
    create_app, external::YrClient, services::ForecastService, AppState, Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "fogcast_server=debug,fogcast_backend=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    if config.log.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting FogCast server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!(
        location = %config.location.name,
        lat = config.location.latitude,
        lon = config.location.longitude,
        "Forecast location"
    );

    let location = config.forecast_location();
    let client = YrClient::new(&config.upstream, location.coordinates)?;
    tracing::info!("Upstream: {}", client.forecast_url());

    let forecast = ForecastService::from_config(&config, Arc::new(client))?;

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        forecast: Arc::new(forecast),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
