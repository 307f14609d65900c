//! deck.gl map specs and their standalone HTML rendering.

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::geo_layer::style::Rgba;
use crate::html::{escape, script_json};

const DECK_JS: &str = "https://unpkg.com/deck.gl@9.0.0/dist.min.js";
const MAPLIBRE_JS: &str = "https://unpkg.com/maplibre-gl@4.1.0/dist/maplibre-gl.js";
const MAPLIBRE_CSS: &str = "https://unpkg.com/maplibre-gl@4.1.0/dist/maplibre-gl.css";
const MAP_STYLE: &str = "https://basemaps.cartocdn.com/gl/dark-matter-gl-style/style.json";

/// JS regex for tooltip placeholders. Keys are any run of non-brace
/// characters, so Hangul column names are filled too.
pub const PLACEHOLDER_PATTERN: &str = r"/\{([^{}]+)\}/g";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

/// One drawable path with its styling and tooltip properties.
#[derive(Debug, Clone, Serialize)]
pub struct PathDatum {
    pub path: Vec<[f64; 2]>,
    pub color: Rgba,
    pub width: u32,
    pub properties: Map<String, Value>,
}

/// One scatter point; `radius` is scaled by the layer's `radius_scale`.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterDatum {
    pub position: [f64; 2],
    pub radius: f64,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathLayer {
    pub id: String,
    pub data: Vec<PathDatum>,
    pub pickable: bool,
    pub auto_highlight: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterplotLayer {
    pub id: String,
    pub data: Vec<ScatterDatum>,
    pub radius_scale: f64,
    pub radius_min_pixels: f64,
    pub radius_max_pixels: f64,
    pub fill_color: [u8; 3],
    pub pickable: bool,
    pub auto_highlight: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Layer {
    #[serde(rename = "PathLayer")]
    Path(PathLayer),
    #[serde(rename = "ScatterplotLayer")]
    Scatterplot(ScatterplotLayer),
}

/// Hover tooltip. `{name}` placeholders are filled from the hovered
/// object's `properties`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Tooltip {
    Html {
        html: String,
        style: Map<String, Value>,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub initial_view_state: ViewState,
    pub layers: Vec<Layer>,
    pub tooltip: Tooltip,
}

impl Deck {
    /// Renders the deck as a self-contained HTML page.
    pub fn to_html(&self, title: &str) -> Result<String> {
        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="ko">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <script src="{deck_js}"></script>
    <script src="{maplibre_js}"></script>
    <link href="{maplibre_css}" rel="stylesheet">
    <style>html, body {{ margin: 0; width: 100%; height: 100%; }} #deck-container {{ width: 100vw; height: 100vh; }}</style>
</head>
<body>
    <div id="deck-container"></div>
    <script>
    const spec = {spec};
    const fill = (template, props) =>
        template.replace({placeholder}, (_, key) => props[key] ?? "");
    const build = (layer) => {{
        switch (layer.type) {{
            case "PathLayer":
                return new deck.PathLayer({{
                    ...layer,
                    getPath: (d) => d.path,
                    getColor: (d) => d.color,
                    getWidth: (d) => d.width,
                }});
            case "ScatterplotLayer":
                return new deck.ScatterplotLayer({{
                    ...layer,
                    getPosition: (d) => d.position,
                    getRadius: (d) => d.radius,
                    getFillColor: layer.fillColor,
                }});
        }}
    }};
    new deck.DeckGL({{
        container: "deck-container",
        mapStyle: "{map_style}",
        initialViewState: spec.initialViewState,
        controller: true,
        layers: spec.layers.map(build),
        getTooltip: ({{ object }}) => {{
            if (!object) return null;
            const t = spec.tooltip;
            return t.html
                ? {{ html: fill(t.html, object.properties), style: t.style }}
                : {{ text: fill(t.text, object.properties) }};
        }},
    }});
    </script>
</body>
</html>"#,
            title = escape(title),
            deck_js = DECK_JS,
            maplibre_js = MAPLIBRE_JS,
            maplibre_css = MAPLIBRE_CSS,
            map_style = MAP_STYLE,
            placeholder = PLACEHOLDER_PATTERN,
            spec = script_json(self)?,
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn test_layer_serializes_with_deck_prop_names() {
        let layer = Layer::Scatterplot(ScatterplotLayer {
            id: "points".to_string(),
            data: vec![],
            radius_scale: 30.0,
            radius_min_pixels: 5.0,
            radius_max_pixels: 100.0,
            fill_color: [255, 140, 0],
            pickable: true,
            auto_highlight: true,
        });

        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "ScatterplotLayer");
        assert_eq!(json["radiusScale"], 30.0);
        assert_eq!(json["autoHighlight"], true);
    }

    #[test]
    fn test_to_html_embeds_spec() {
        let deck = Deck {
            initial_view_state: ViewState {
                latitude: 37.5,
                longitude: 127.0,
                zoom: 12.0,
                pitch: 0.0,
            },
            layers: vec![],
            tooltip: Tooltip::Text {
                text: "</script>{name}".to_string(),
            },
        };

        let html = deck.to_html("A & B").unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains(r#""initialViewState":{"latitude":37.5"#));
        assert!(html.contains(r"<\/script>{name}"));
        assert!(html.contains(&format!("template.replace({PLACEHOLDER_PATTERN},")));
        assert!(!html.contains(r"\w+"));
    }

    #[test]
    fn test_fill_placeholders_accepts_non_ascii_keys() {
        let mut props = Map::new();
        props.insert("사상자수".into(), serde_json::json!(3));
        props.insert("VDS_CD".into(), serde_json::json!("A1"));

        assert_eq!(
            fill_placeholders("{사상자수} / {VDS_CD} / {missing} / {}", &props),
            "3 / A1 /  / {}"
        );
    }

    // Helper functions for tests

    /// Mirrors the page's `fill`: `{key}` with a brace-free, non-empty key
    /// becomes the property value, or nothing when the key is absent.
    pub(crate) fn fill_placeholders(template: &str, props: &Map<String, Value>) -> String {
        let mut out = String::new();
        let mut rest = template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find(['{', '}']) {
                Some(end) if end > 0 && after[end..].starts_with('}') => {
                    let key = &after[..end];
                    match props.get(key) {
                        Some(Value::String(s)) => out.push_str(s),
                        Some(Value::Null) | None => {}
                        Some(v) => out.push_str(&v.to_string()),
                    }
                    rest = &after[end + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}
