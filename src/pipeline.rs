//! Load → aggregate → chart → embed, driven by a [`DashboardConfig`].

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analyzers::analyzer::{load_accidents, load_black_spots};
use crate::analyzers::{DeathAnalysis, analyze};
use crate::charts::DeathFigures;
use crate::config::DashboardConfig;
use crate::dashboard::{DEATH_ANALYSIS_MAP, Dashboard};
use crate::geo_layer::{MapDocument, black_spot_document, casualty_document};
use crate::output::write_document;
use crate::records::AccidentRecord;
use crate::stats::DatasetStats;

/// Accident records with everything derived from them.
#[derive(Debug)]
pub struct AccidentData {
    pub records: Vec<AccidentRecord>,
    pub analysis: DeathAnalysis,
    pub stats: DatasetStats,
}

/// Loads the configured accident dataset and aggregates it.
#[tracing::instrument(skip(config), fields(source = %config.accidents.path))]
pub async fn load_accident_data(config: &DashboardConfig) -> Result<AccidentData> {
    let source = &config.accidents;
    let records = load_accidents(&source.path, &source.encoding).await?;

    let stats = DatasetStats::from_records(&records);
    info!(
        rows = stats.rows,
        deaths = stats.deaths,
        casualties = stats.casualties,
        position_pct = stats.position_pct(),
        "Accident dataset summary"
    );

    let analysis = analyze(&records, source.seasonal_basis)
        .with_context(|| format!("Failed to aggregate {}", source.path))?;

    Ok(AccidentData {
        records,
        analysis,
        stats,
    })
}

/// Renders one path-layer document per configured black-spot dataset, in
/// configuration order.
pub async fn load_black_spot_documents(config: &DashboardConfig) -> Result<Vec<MapDocument>> {
    let mut docs = Vec::with_capacity(config.black_spots.len());
    for source in &config.black_spots {
        let segments = load_black_spots(&source.path, &source.encoding).await?;
        docs.push(black_spot_document(&source.id, &source.label, &segments)?);
    }
    Ok(docs)
}

/// Builds the complete dashboard. Any load, parse or aggregation failure
/// is returned and nothing is served.
#[tracing::instrument(skip(config))]
pub async fn build_dashboard(config: &DashboardConfig) -> Result<Dashboard> {
    config.validate()?;
    let data = load_accident_data(config).await?;
    let black_spots = load_black_spot_documents(config).await?;

    let casualty_map = casualty_document(
        DEATH_ANALYSIS_MAP,
        &config.accidents.map_label,
        &data.records,
    )?;
    let figures = DeathFigures::from_analysis(&data.analysis);

    let dashboard = Dashboard::new(
        config.title.clone(),
        config.subtitle.clone(),
        black_spots,
        casualty_map,
        figures,
    );
    info!(maps = dashboard.maps().count(), "Dashboard built");

    Ok(dashboard)
}

/// Writes every map document of `dashboard` into `dir`.
pub fn publish_documents(dashboard: &Dashboard, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let paths = dashboard
        .maps()
        .map(|doc| write_document(dir, doc))
        .collect::<Result<Vec<_>>>()?;

    info!(dir = %dir.display(), documents = paths.len(), "Map documents published");
    Ok(paths)
}
