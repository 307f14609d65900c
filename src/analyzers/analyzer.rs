use crate::analyzers::aggregate::{hourly_totals, monthly_totals, seasonal_ratios, weekday_totals};
use crate::analyzers::error::AggregateError;
use crate::analyzers::types::{DeathAnalysis, SeasonalBasis};
use crate::fetch::load_source;
use crate::parser::{parse_accidents, parse_black_spots};
use crate::records::{AccidentRecord, BlackSpotSegment};
use anyhow::Result;
use tracing::info;

/// Loads and decodes the accident dataset at `source`.
#[tracing::instrument(fields(source = %source))]
pub async fn load_accidents(source: &str, encoding: &str) -> Result<Vec<AccidentRecord>> {
    let bytes = load_source(source).await?;
    let records = parse_accidents(&bytes, encoding)?;
    info!(rows = records.len(), "Accident records loaded");
    Ok(records)
}

/// Loads and decodes a black-spot dataset at `source`.
#[tracing::instrument(fields(source = %source))]
pub async fn load_black_spots(source: &str, encoding: &str) -> Result<Vec<BlackSpotSegment>> {
    let bytes = load_source(source).await?;
    let segments = parse_black_spots(&bytes, encoding)?;
    info!(segments = segments.len(), "Black-spot segments loaded");
    Ok(segments)
}

/// Builds all four summary tables from one record set.
#[tracing::instrument(skip(records), fields(rows = records.len()))]
pub fn analyze(
    records: &[AccidentRecord],
    basis: SeasonalBasis,
) -> Result<DeathAnalysis, AggregateError> {
    let analysis = DeathAnalysis {
        basis,
        seasonal: seasonal_ratios(records, basis)?,
        monthly: monthly_totals(records)?,
        weekday: weekday_totals(records)?,
        hourly: hourly_totals(records)?,
    };

    info!(
        seasons = analysis.seasonal.len(),
        months = analysis.monthly.len(),
        hours = analysis.hourly.len(),
        "Death analysis computed"
    );

    Ok(analysis)
}
