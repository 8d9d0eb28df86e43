//! Shared types and fog forecast logic for FogCast
//!
//! This crate holds the I/O-free core used by the backend and the browser
//! (via WASM): fog severity classification, weather symbol resolution,
//! day-part bucketing and the aggregation of a raw time series into a
//! display-ready snapshot.

pub mod aggregate;
pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use aggregate::*;
pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
