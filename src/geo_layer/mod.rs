//! Map layers for black-spot segments and accident points.
//!
//! Each layer is rendered once into a standalone HTML [`MapDocument`], which
//! is written to disk and embedded by the dashboard pages.

pub mod deck;
pub mod path;
pub mod scatter;
pub mod style;

use anyhow::Result;

use crate::records::{AccidentRecord, BlackSpotSegment};

pub use deck::Deck;

/// A rendered, self-contained map page.
#[derive(Debug, Clone)]
pub struct MapDocument {
    pub id: String,
    pub title: String,
    pub html: String,
}

impl MapDocument {
    /// File name used when the document is published, e.g.
    /// `black-spot-2021_layer.html`.
    pub fn file_name(&self) -> String {
        format!("{}_layer.html", self.id)
    }
}

/// Renders the path layer for one black-spot dataset.
#[tracing::instrument(skip(segments), fields(segments = segments.len()))]
pub fn black_spot_document(id: &str, title: &str, segments: &[BlackSpotSegment]) -> Result<MapDocument> {
    let deck = path::black_spot_deck(id, segments)?;
    Ok(MapDocument {
        id: id.to_string(),
        title: title.to_string(),
        html: deck.to_html(title)?,
    })
}

/// Renders the casualty scatter layer.
#[tracing::instrument(skip(records), fields(rows = records.len()))]
pub fn casualty_document(id: &str, title: &str, records: &[AccidentRecord]) -> Result<MapDocument> {
    let deck = scatter::casualty_deck(id, records)?;
    Ok(MapDocument {
        id: id.to_string(),
        title: title.to_string(),
        html: deck.to_html(title)?,
    })
}
