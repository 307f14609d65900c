//! Output formatting and persistence for analysis results.
//!
//! Supports pretty-printing, JSON logging, CSV tables and HTML documents.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::geo_layer::MapDocument;
use csv::WriterBuilder;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `rows` to a new CSV file at `path`, header first.
///
/// An existing file is replaced.
pub fn write_table<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes an HTML page named `file_name` into `dir`, creating `dir` if
/// needed, and returns the written path.
pub fn write_page(dir: impl AsRef<Path>, file_name: &str, html: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(file_name);
    fs::write(&path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = html.len(), "Page written");

    Ok(path)
}

/// Publishes a map document as `<dir>/<id>_layer.html`.
pub fn write_document(dir: impl AsRef<Path>, doc: &MapDocument) -> Result<PathBuf> {
    write_page(dir, &doc.file_name(), &doc.html)
}
