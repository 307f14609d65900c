//! Dashboard composition.
//!
//! [`Dashboard`] owns every prebuilt chart and map document. A [`Selection`]
//! (analysis view plus enabled chart ids) is resolved against it on each
//! request to produce the visible [`Component`]s.

pub mod html;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::charts::{DeathFigures, Figure};
use crate::geo_layer::MapDocument;

pub const DEATH_ANALYSIS_MAP: &str = "death-analysis";
pub const PIE_CHART: &str = "pie-chart";
pub const HOURLY_BAR_CHART: &str = "hourly-bar-chart";
pub const WEEKDAY_BAR_CHART: &str = "weekday-bar-chart";
pub const MONTHLY_BAR_CHART: &str = "monthly-bar-chart";

const FULL_FRAME: &str = "width: 100%; height: 80vh";
const HALF_FRAME: &str = "width: 100%; height: 50vh";

/// Top-level dropdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisView {
    #[default]
    BlackSpot,
    DeathAnalysis,
}

impl AnalysisView {
    pub const ALL: [AnalysisView; 2] = [AnalysisView::BlackSpot, AnalysisView::DeathAnalysis];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisView::BlackSpot => "black-spot",
            AnalysisView::DeathAnalysis => "death-analysis",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalysisView::BlackSpot => "블랙스팟",
            AnalysisView::DeathAnalysis => "사망데이터 분석",
        }
    }
}

impl fmt::Display for AnalysisView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisView {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown analysis view '{s}'"))
    }
}

/// An entry of the dependent chart dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartOption {
    pub label: String,
    pub value: String,
}

impl ChartOption {
    fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Current view plus the chart ids enabled within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub view: AnalysisView,
    pub charts: Vec<String>,
}

impl Selection {
    /// Moves to `view`. Changing view resets the charts to that view's
    /// default; selecting the current view keeps them.
    pub fn switch_view(&mut self, view: AnalysisView, dashboard: &Dashboard) {
        if view != self.view {
            self.view = view;
            self.charts = dashboard.default_charts(view);
        }
    }

    /// Replaces the enabled charts. Any list is accepted; ids that are not
    /// options of the current view simply render nothing.
    pub fn set_charts(&mut self, charts: Vec<String>) {
        self.charts = charts;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    MapFrame,
    Graph,
}

#[derive(Debug, Clone, Copy)]
pub enum Content<'a> {
    Map(&'a MapDocument),
    Figure(&'a Figure),
}

/// One visible piece of the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Component<'a> {
    pub kind: ComponentKind,
    pub id: String,
    pub style: &'static str,
    #[serde(skip)]
    pub content: Content<'a>,
}

/// One of the four panels of the death-chart toggle page.
#[derive(Debug, Clone)]
pub struct DeathPanel<'a> {
    pub toggle: &'static str,
    pub label: &'static str,
    pub id: &'static str,
    pub figure: &'a Figure,
    pub visible: bool,
    pub width: &'static str,
}

impl DeathPanel<'_> {
    pub fn style(&self) -> String {
        if self.visible {
            format!(
                "width: {}; display: inline-block; background-color: #000000",
                self.width
            )
        } else {
            "display: none".to_string()
        }
    }
}

/// Death-chart toggle values in display order.
pub const DEATH_TOGGLES: [&str; 4] = ["pie", "monthly", "weekday", "hourly"];

/// Prebuilt charts and map documents, composed per selection.
#[derive(Debug)]
pub struct Dashboard {
    pub title: String,
    pub subtitle: String,
    black_spots: Vec<MapDocument>,
    casualty_map: MapDocument,
    figures: DeathFigures,
}

impl Dashboard {
    pub fn new(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        black_spots: Vec<MapDocument>,
        casualty_map: MapDocument,
        figures: DeathFigures,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            black_spots,
            casualty_map,
            figures,
        }
    }

    /// Options of the chart dropdown for `view`.
    pub fn options(&self, view: AnalysisView) -> Vec<ChartOption> {
        match view {
            AnalysisView::BlackSpot => self
                .black_spots
                .iter()
                .map(|doc| ChartOption::new(&doc.title, &doc.id))
                .chain(std::iter::once(ChartOption::new(
                    &self.casualty_map.title,
                    DEATH_ANALYSIS_MAP,
                )))
                .collect(),
            AnalysisView::DeathAnalysis => vec![
                ChartOption::new("파이차트", PIE_CHART),
                ChartOption::new("시간대별 바차트", HOURLY_BAR_CHART),
                ChartOption::new("요일별 바차트", WEEKDAY_BAR_CHART),
                ChartOption::new("월별 바차트", MONTHLY_BAR_CHART),
            ],
        }
    }

    /// Charts enabled right after switching to `view`.
    pub fn default_charts(&self, view: AnalysisView) -> Vec<String> {
        match view {
            AnalysisView::BlackSpot => self
                .black_spots
                .first()
                .map(|doc| vec![doc.id.clone()])
                .unwrap_or_default(),
            AnalysisView::DeathAnalysis => vec![PIE_CHART.to_string()],
        }
    }

    pub fn initial_selection(&self) -> Selection {
        let view = AnalysisView::default();
        Selection {
            view,
            charts: self.default_charts(view),
        }
    }

    /// Resolves request parameters into a selection.
    ///
    /// An unknown or missing view falls back to the initial view. Without a
    /// `charts` list the view's default applies; `charts` is a
    /// comma-separated id list and may be empty.
    pub fn selection_from(&self, view: Option<&str>, charts: Option<&str>) -> Selection {
        let mut selection = self.initial_selection();
        if let Some(view) = view.and_then(|v| v.parse().ok()) {
            selection.switch_view(view, self);
        }
        if let Some(charts) = charts {
            selection.set_charts(
                charts
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }
        selection
    }

    /// Visible components for `selection`, in selection order.
    pub fn render(&self, selection: &Selection) -> Vec<Component<'_>> {
        selection
            .charts
            .iter()
            .filter_map(|chart| match selection.view {
                AnalysisView::BlackSpot => self.black_spot_component(chart),
                AnalysisView::DeathAnalysis => self.death_component(chart),
            })
            .collect()
    }

    fn black_spot_component(&self, chart: &str) -> Option<Component<'_>> {
        if chart == DEATH_ANALYSIS_MAP {
            return Some(Component {
                kind: ComponentKind::MapFrame,
                id: "deck-iframe".to_string(),
                style: HALF_FRAME,
                content: Content::Map(&self.casualty_map),
            });
        }

        self.black_spots
            .iter()
            .find(|doc| doc.id == chart)
            .map(|doc| Component {
                kind: ComponentKind::MapFrame,
                id: format!("iframe-{}", doc.id),
                style: FULL_FRAME,
                content: Content::Map(doc),
            })
    }

    fn death_component(&self, chart: &str) -> Option<Component<'_>> {
        let (id, style, figure) = match chart {
            PIE_CHART => (
                "seasonal-death-pie-chart",
                "width: 33%; display: inline-block",
                &self.figures.pie,
            ),
            MONTHLY_BAR_CHART => (
                "monthly-death-bar-chart",
                "width: 34%; display: inline-block",
                &self.figures.monthly,
            ),
            WEEKDAY_BAR_CHART => (
                "weekday-death-bar-chart",
                "width: 33%; display: inline-block",
                &self.figures.weekday,
            ),
            HOURLY_BAR_CHART => (
                "hourly-death-bar-chart",
                "width: 100%; float: left",
                &self.figures.hourly,
            ),
            _ => return None,
        };

        Some(Component {
            kind: ComponentKind::Graph,
            id: id.to_string(),
            style,
            content: Content::Figure(figure),
        })
    }

    /// All four death panels with visibility from the toggle values.
    pub fn death_panels(&self, toggles: &[String]) -> Vec<DeathPanel<'_>> {
        let is_on = |t: &str| toggles.iter().any(|s| s == t);

        vec![
            DeathPanel {
                toggle: "pie",
                label: "계절별 사고 비율",
                id: "seasonal-death-pie-chart",
                figure: &self.figures.pie,
                visible: is_on("pie"),
                width: "33%",
            },
            DeathPanel {
                toggle: "monthly",
                label: "월별 사망자수",
                id: "monthly-death-bar-chart",
                figure: &self.figures.monthly,
                visible: is_on("monthly"),
                width: "33%",
            },
            DeathPanel {
                toggle: "weekday",
                label: "요일별 사망자수",
                id: "weekday-death-bar-chart",
                figure: &self.figures.weekday,
                visible: is_on("weekday"),
                width: "33%",
            },
            DeathPanel {
                toggle: "hourly",
                label: "시간대별 사망자수",
                id: "hourly-death-bar-chart",
                figure: &self.figures.hourly,
                visible: is_on("hourly"),
                width: "100%",
            },
        ]
    }

    /// Every map document, black-spot layers first.
    pub fn maps(&self) -> impl Iterator<Item = &MapDocument> {
        self.black_spots
            .iter()
            .chain(std::iter::once(&self.casualty_map))
    }

    pub fn map(&self, id: &str) -> Option<&MapDocument> {
        self.maps().find(|doc| doc.id == id)
    }
}
