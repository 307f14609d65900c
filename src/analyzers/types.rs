//! Summary tables produced by the aggregation pipeline.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Which formula the seasonal ratio uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeasonalBasis {
    /// Deaths per season divided by traffic volume per season, × 1000.
    #[default]
    DeathsPerTraffic,
    /// Accidents per season divided by all accidents, × 100.
    AccidentShare,
}

impl SeasonalBasis {
    pub fn scale(self) -> f64 {
        match self {
            SeasonalBasis::DeathsPerTraffic => 1000.0,
            SeasonalBasis::AccidentShare => 100.0,
        }
    }
}

/// Ratio for one season, alongside the sums it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalRatio {
    pub season: String,
    pub accidents: usize,
    pub deaths: u64,
    pub traffic_volume: f64,
    pub ratio: f64,
}

/// Deaths in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub deaths: u64,
}

impl MonthlyTotal {
    /// `YYYY-MM`, used as the chart axis value.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Deaths on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayTotal {
    #[serde(skip)]
    pub weekday: Weekday,
    pub label: &'static str,
    pub deaths: u64,
}

/// Deaths in one hour of the day plus the min-max normalized value used
/// for the bar color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyTotal {
    pub hour: u32,
    pub deaths: u64,
    pub normalized: f64,
}

/// All four summary tables for one accident dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DeathAnalysis {
    pub basis: SeasonalBasis,
    pub seasonal: Vec<SeasonalRatio>,
    pub monthly: Vec<MonthlyTotal>,
    pub weekday: Vec<WeekdayTotal>,
    pub hourly: Vec<HourlyTotal>,
}

/// Korean display label for a weekday.
pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "월요일",
        Weekday::Tue => "화요일",
        Weekday::Wed => "수요일",
        Weekday::Thu => "목요일",
        Weekday::Fri => "금요일",
        Weekday::Sat => "토요일",
        Weekday::Sun => "일요일",
    }
}
