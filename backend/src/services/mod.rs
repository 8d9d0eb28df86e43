//! Services for the FogCast server

pub mod cache;
pub mod forecast;

pub use cache::{CacheEntry, Clock, ForecastCache, ManualClock, SystemClock};
pub use forecast::ForecastService;
