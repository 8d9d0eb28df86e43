//! Forecast service: cached, aggregated forecast for the configured location

use std::sync::Arc;

use shared::{ForecastAggregator, ForecastLocation, ForecastSnapshot};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::ForecastFetcher;
use crate::services::cache::ForecastCache;

/// Serves the snapshot for one fixed location
#[derive(Clone)]
pub struct ForecastService {
    cache: Arc<ForecastCache>,
    fetcher: Arc<dyn ForecastFetcher>,
    aggregator: Arc<ForecastAggregator>,
    location: ForecastLocation,
}

impl ForecastService {
    pub fn new(
        cache: Arc<ForecastCache>,
        fetcher: Arc<dyn ForecastFetcher>,
        aggregator: ForecastAggregator,
        location: ForecastLocation,
    ) -> Self {
        Self {
            cache,
            fetcher,
            aggregator: Arc::new(aggregator),
            location,
        }
    }

    /// Build the service from configuration with the given fetcher
    pub fn from_config(config: &Config, fetcher: Arc<dyn ForecastFetcher>) -> AppResult<Self> {
        let aggregator = ForecastAggregator::new(config.aggregation_options())
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        Ok(Self::new(
            Arc::new(ForecastCache::new(&config.cache)),
            fetcher,
            aggregator,
            config.forecast_location(),
        ))
    }

    /// Current snapshot, refreshed from upstream when the cached one expired
    pub async fn current_forecast(&self) -> AppResult<Arc<ForecastSnapshot>> {
        let key = self.location.coordinates.cache_key();
        let aggregator = Arc::clone(&self.aggregator);
        let location = &self.location;

        self.cache
            .get_or_refresh(&key, self.fetcher.as_ref(), |document| {
                aggregator.aggregate(document, location)
            })
            .await
    }

    /// Number of cached locations
    pub async fn cached_entries(&self) -> usize {
        self.cache.len().await
    }
}
