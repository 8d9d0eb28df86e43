//! Domain models for the fog forecast

mod day_part;
mod fog;
mod forecast;
mod symbol;
mod timeseries;

pub use day_part::*;
pub use fog::*;
pub use forecast::*;
pub use symbol::*;
pub use timeseries::*;
