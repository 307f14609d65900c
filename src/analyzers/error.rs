use thiserror::Error;

/// Failures raised while building the summary tables.
#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error("no accident records to aggregate")]
    Empty,
    #[error("season '{season}' has zero traffic volume")]
    ZeroTraffic { season: String },
    #[error("cannot normalize {series}: every bucket equals {value}")]
    FlatSeries { series: &'static str, value: f64 },
}
