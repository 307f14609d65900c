//! Black-spot path layer.

use anyhow::Result;
use geo::Centroid;
use serde_json::{Map, Value, json};

use crate::geo_layer::deck::{Deck, Layer, PathDatum, PathLayer, Tooltip, ViewState};
use crate::geo_layer::style::{SeverityRange, line_color, line_width};
use crate::records::BlackSpotSegment;

const BLACK_SPOT_ZOOM: f64 = 12.0;

const BLACK_SPOT_TOOLTIP: &str = "<b>VDS_CD:</b> {VDS_CD}<br><b>Count:</b> {count}<br>\
     <b>Speed:</b> {SPD_AVG}<br><b>Traffic Volume:</b> {TRFFCVLM}";

fn segment_properties(segment: &BlackSpotSegment) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("VDS_CD".into(), json!(segment.name));
    props.insert("count".into(), json!(segment.count));
    props.insert("SPD_AVG".into(), json!(segment.speed_avg));
    props.insert("TRFFCVLM".into(), json!(segment.traffic_volume));
    props.insert("black-spot".into(), json!(segment.severity));
    props
}

/// Builds the path deck for one black-spot dataset, centered on the
/// segment with the highest severity.
///
/// # Errors
///
/// Returns an error if there are no segments or the worst segment has no
/// coordinates.
pub fn black_spot_deck(id: &str, segments: &[BlackSpotSegment]) -> Result<Deck> {
    let range = SeverityRange::from_values(segments.iter().map(|s| s.severity))
        .ok_or_else(|| anyhow::anyhow!("Black-spot layer '{id}' has no segments"))?;

    // First segment at the maximum, matching idxmax semantics.
    let worst = segments
        .iter()
        .find(|s| s.severity == range.max)
        .ok_or_else(|| anyhow::anyhow!("Black-spot layer '{id}' has no finite maximum"))?;
    let center = worst
        .path
        .centroid()
        .ok_or_else(|| anyhow::anyhow!("Segment '{}' has an empty geometry", worst.name))?;

    let data = segments
        .iter()
        .map(|s| PathDatum {
            path: s.path.coords().map(|c| [c.x, c.y]).collect(),
            color: line_color(s.severity, range),
            width: line_width(s.marker.as_deref()),
            properties: segment_properties(s),
        })
        .collect();

    let mut style = Map::new();
    style.insert("backgroundColor".into(), json!("steelblue"));
    style.insert("color".into(), json!("white"));

    Ok(Deck {
        initial_view_state: ViewState {
            latitude: center.y(),
            longitude: center.x(),
            zoom: BLACK_SPOT_ZOOM,
            pitch: 0.0,
        },
        layers: vec![Layer::Path(PathLayer {
            id: id.to_string(),
            data,
            pickable: true,
            auto_highlight: true,
        })],
        tooltip: Tooltip::Html {
            html: BLACK_SPOT_TOOLTIP.to_string(),
            style,
        },
    })
}
