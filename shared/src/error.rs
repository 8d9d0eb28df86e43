//! Errors raised while reading an upstream forecast document

use thiserror::Error;

/// The upstream document does not have the shape the aggregator needs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("Missing field in forecast document: {0}")]
    MissingField(&'static str),

    #[error("Forecast document has an empty time series")]
    EmptySeries,

    #[error("Malformed forecast document: {0}")]
    Malformed(String),
}
