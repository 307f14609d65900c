//! Accident aggregation.
//!
//! Turns a row-per-accident dataset into the seasonal, monthly, weekday and
//! hourly death tables every dashboard surface is built from.

pub mod aggregate;
pub mod analyzer;
pub mod error;
pub mod types;
pub mod utility;

pub use analyzer::analyze;
pub use error::AggregateError;
pub use types::{DeathAnalysis, SeasonalBasis};
