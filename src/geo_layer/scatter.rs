//! Casualty scatter layer: one point per accident, sized by casualties.

use anyhow::Result;
use serde_json::{Map, json};

use crate::analyzers::utility::mean;
use crate::geo_layer::deck::{Deck, Layer, ScatterDatum, ScatterplotLayer, Tooltip, ViewState};
use crate::records::AccidentRecord;

const SCATTER_ZOOM: f64 = 10.0;
const FILL_COLOR: [u8; 3] = [255, 140, 0];

const CASUALTY_TOOLTIP: &str = "사상자수: {사상자수},사망자수: {사망자수},중상자수: {중상자수}, \
     경상자수: {경상자수}, 부상신고자수: {부상신고자수}";

/// Builds the casualty scatter deck, centered on the mean coordinate.
///
/// Records without both coordinates are left off the map.
///
/// # Errors
///
/// Returns an error if no record has a position.
pub fn casualty_deck(id: &str, records: &[AccidentRecord]) -> Result<Deck> {
    let data: Vec<ScatterDatum> = records
        .iter()
        .filter_map(|r| {
            let position = r.position()?;
            let mut properties = Map::new();
            properties.insert("사상자수".into(), json!(r.casualties));
            properties.insert("사망자수".into(), json!(r.deaths));
            properties.insert("중상자수".into(), json!(r.serious_injuries));
            properties.insert("경상자수".into(), json!(r.minor_injuries));
            properties.insert("부상신고자수".into(), json!(r.reported_injuries));

            Some(ScatterDatum {
                position,
                radius: f64::from(r.casualties.unwrap_or(0)),
                properties,
            })
        })
        .collect();

    if data.is_empty() {
        anyhow::bail!("No accident record has both coordinates");
    }

    let longitudes: Vec<f64> = data.iter().map(|d| d.position[0]).collect();
    let latitudes: Vec<f64> = data.iter().map(|d| d.position[1]).collect();

    Ok(Deck {
        initial_view_state: ViewState {
            latitude: mean(&latitudes),
            longitude: mean(&longitudes),
            zoom: SCATTER_ZOOM,
            pitch: 0.0,
        },
        layers: vec![Layer::Scatterplot(ScatterplotLayer {
            id: id.to_string(),
            data,
            radius_scale: 30.0,
            radius_min_pixels: 5.0,
            radius_max_pixels: 100.0,
            fill_color: FILL_COLOR,
            pickable: true,
            auto_highlight: true,
        })],
        tooltip: Tooltip::Text {
            text: CASUALTY_TOOLTIP.to_string(),
        },
    })
}
