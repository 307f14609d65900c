//! Plotly figure specs for the death-analysis charts.
//!
//! Figures are plain JSON (`{data, layout}`) handed to `Plotly.newPlot` in
//! the browser, so they can be built once and embedded in any page.

use serde::Serialize;

use crate::analyzers::DeathAnalysis;
use crate::analyzers::types::{HourlyTotal, MonthlyTotal, SeasonalRatio, WeekdayTotal};

const YEAR_COLORS: [&str; 2] = ["yellow", "orange"];
const DEATHS_AXIS: &str = "사망자 수";

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: Title,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub color: &'static str,
}

/// Layout approximating plotly's `plotly_dark` template.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub showlegend: bool,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    pub font: Font,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
}

impl Layout {
    fn dark(title: &str) -> Self {
        Self {
            title: Title::new(title),
            showlegend: true,
            paper_bgcolor: "rgb(17,17,17)",
            plot_bgcolor: "rgb(17,17,17)",
            font: Font { color: "#f2f5fa" },
            xaxis: None,
            yaxis: None,
        }
    }

    fn with_axes(mut self, x: &str, y: &str) -> Self {
        self.xaxis = Some(Axis { title: Title::new(x) });
        self.yaxis = Some(Axis { title: Title::new(y) });
        self
    }
}

/// Either one color for every bar or a numeric series mapped through a
/// colorscale.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Fixed(String),
    Scaled(Vec<f64>),
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub color: MarkerColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PieTrace {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarTrace {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: Vec<String>,
    pub y: Vec<u64>,
    pub marker: Marker,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Pie(PieTrace),
    Bar(BarTrace),
}

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// Pie of the seasonal ratio, one slice per season.
pub fn seasonal_pie(seasonal: &[SeasonalRatio]) -> Figure {
    Figure {
        data: vec![Trace::Pie(PieTrace {
            labels: seasonal.iter().map(|s| s.season.clone()).collect(),
            values: seasonal.iter().map(|s| s.ratio).collect(),
        })],
        layout: Layout::dark("계절별 사고 비율"),
    }
}

/// Monthly deaths, one trace per year so each year gets its own color.
pub fn monthly_bar(monthly: &[MonthlyTotal]) -> Figure {
    let mut traces: Vec<BarTrace> = Vec::new();

    for m in monthly {
        let year = m.year.to_string();
        if traces.last().and_then(|t| t.name.as_deref()) != Some(year.as_str()) {
            let color = YEAR_COLORS[traces.len() % YEAR_COLORS.len()];
            traces.push(BarTrace {
                name: Some(year),
                x: Vec::new(),
                y: Vec::new(),
                marker: Marker {
                    color: MarkerColor::Fixed(color.to_string()),
                    colorscale: None,
                    showscale: None,
                },
            });
        }
        if let Some(trace) = traces.last_mut() {
            trace.x.push(m.label());
            trace.y.push(m.deaths);
        }
    }

    Figure {
        data: traces.into_iter().map(Trace::Bar).collect(),
        layout: Layout::dark("월별 사망자수").with_axes("월", DEATHS_AXIS),
    }
}

/// Weekday deaths in the table's (descending) order.
pub fn weekday_bar(weekday: &[WeekdayTotal]) -> Figure {
    Figure {
        data: vec![Trace::Bar(BarTrace {
            name: None,
            x: weekday.iter().map(|w| w.label.to_string()).collect(),
            y: weekday.iter().map(|w| w.deaths).collect(),
            marker: Marker {
                color: MarkerColor::Fixed("blue".to_string()),
                colorscale: None,
                showscale: None,
            },
        })],
        layout: Layout::dark("요일별 사망자수").with_axes("요일", DEATHS_AXIS),
    }
}

/// Hourly deaths, colored by the normalized value on a red scale.
pub fn hourly_bar(hourly: &[HourlyTotal]) -> Figure {
    let mut layout = Layout::dark("시간대별 사망자수").with_axes("시간대", DEATHS_AXIS);
    layout.showlegend = false;

    Figure {
        data: vec![Trace::Bar(BarTrace {
            name: None,
            x: hourly.iter().map(|h| h.hour.to_string()).collect(),
            y: hourly.iter().map(|h| h.deaths).collect(),
            marker: Marker {
                color: MarkerColor::Scaled(hourly.iter().map(|h| h.normalized).collect()),
                colorscale: Some("Reds"),
                showscale: Some(true),
            },
        })],
        layout,
    }
}

/// The four death-analysis figures, built once per dataset.
#[derive(Debug, Clone)]
pub struct DeathFigures {
    pub pie: Figure,
    pub monthly: Figure,
    pub weekday: Figure,
    pub hourly: Figure,
}

impl DeathFigures {
    pub fn from_analysis(analysis: &DeathAnalysis) -> Self {
        Self {
            pie: seasonal_pie(&analysis.seasonal),
            monthly: monthly_bar(&analysis.monthly),
            weekday: weekday_bar(&analysis.weekday),
            hourly: hourly_bar(&analysis.hourly),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_monthly_bar_splits_years() {
        let monthly = vec![
            MonthlyTotal { year: 2021, month: 11, deaths: 2 },
            MonthlyTotal { year: 2021, month: 12, deaths: 0 },
            MonthlyTotal { year: 2022, month: 1, deaths: 4 },
        ];

        let figure = monthly_bar(&monthly);
        let json = serde_json::to_value(&figure).unwrap();

        assert_eq!(json["data"].as_array().unwrap().len(), 2);
        assert_eq!(json["data"][0]["type"], "bar");
        assert_eq!(json["data"][0]["name"], "2021");
        assert_eq!(json["data"][0]["marker"]["color"], "yellow");
        assert_eq!(json["data"][0]["x"][1], "2021-12");
        assert_eq!(json["data"][1]["marker"]["color"], "orange");
        assert_eq!(json["data"][1]["y"][0], 4);
        assert_eq!(json["layout"]["xaxis"]["title"]["text"], "월");
    }

    #[test]
    fn test_hourly_bar_uses_normalized_colors() {
        let hourly = vec![
            HourlyTotal { hour: 1, deaths: 1, normalized: 0.0 },
            HourlyTotal { hour: 13, deaths: 9, normalized: 1.0 },
        ];

        let json = serde_json::to_value(hourly_bar(&hourly)).unwrap();

        assert_eq!(json["data"][0]["marker"]["color"][1], 1.0);
        assert_eq!(json["data"][0]["marker"]["colorscale"], "Reds");
        assert_eq!(json["layout"]["showlegend"], false);
    }

    #[test]
    fn test_seasonal_pie_and_weekday_bar() {
        let pie = seasonal_pie(&[SeasonalRatio {
            season: "봄".to_string(),
            accidents: 2,
            deaths: 1,
            traffic_volume: 100.0,
            ratio: 10.0,
        }]);
        let json = serde_json::to_value(&pie).unwrap();
        assert_eq!(json["data"][0]["type"], "pie");
        assert_eq!(json["data"][0]["labels"][0], "봄");
        assert!(json["layout"].get("xaxis").is_none());

        let bar = weekday_bar(&[WeekdayTotal {
            weekday: Weekday::Fri,
            label: "금요일",
            deaths: 3,
        }]);
        let json = serde_json::to_value(&bar).unwrap();
        assert_eq!(json["data"][0]["x"][0], "금요일");
        assert_eq!(json["data"][0]["marker"]["color"], "blue");
    }
}
