//! Row types for the accident and black-spot datasets.
//!
//! Column names are the exact headers of the source exports, so any schema
//! drift surfaces as a deserialization error at load time.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use geo::LineString;
use serde::{Deserialize, Deserializer};
use wkt::TryFromWkt;

/// One accident. Only the columns used by the aggregates and the scatter
/// map are kept; everything else in the export is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AccidentRecord {
    #[serde(rename = "발생년월일시", deserialize_with = "deserialize_occurred_at")]
    pub occurred_at: NaiveDateTime,
    #[serde(rename = "계절")]
    pub season: String,
    #[serde(rename = "교통량", default)]
    pub traffic_volume: Option<f64>,
    #[serde(rename = "사망자수")]
    pub deaths: u32,
    #[serde(rename = "중상자수", default)]
    pub serious_injuries: Option<u32>,
    #[serde(rename = "경상자수", default)]
    pub minor_injuries: Option<u32>,
    #[serde(rename = "부상신고자수", default)]
    pub reported_injuries: Option<u32>,
    #[serde(rename = "사상자수", default)]
    pub casualties: Option<u32>,
    #[serde(rename = "x좌표값", default)]
    pub longitude: Option<f64>,
    #[serde(rename = "y좌표값", default)]
    pub latitude: Option<f64>,
}

impl AccidentRecord {
    /// Returns `(longitude, latitude)` when both coordinates are present.
    pub fn position(&self) -> Option<[f64; 2]> {
        Some([self.longitude?, self.latitude?])
    }
}

/// Parses the combined `YYYYMMDDHH` occurrence field.
///
/// # Errors
///
/// Returns an error if the value is not ten digits or does not name a real
/// calendar hour.
pub fn parse_occurred_at(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if raw.len() != 10 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        anyhow::bail!("expected YYYYMMDDHH, got '{raw}'");
    }

    let date = NaiveDate::parse_from_str(&raw[..8], "%Y%m%d")
        .with_context(|| format!("invalid date in '{raw}'"))?;
    let hour: u32 = raw[8..].parse()?;

    date.and_hms_opt(hour, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid hour in '{raw}'"))
}

fn deserialize_occurred_at<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_occurred_at(&raw).map_err(serde::de::Error::custom)
}

/// A black-spot row as it appears in the CSV export.
#[derive(Debug, Deserialize)]
pub struct BlackSpotRow {
    pub geometry: String,
    #[serde(rename = "black-spot")]
    pub black_spot: f64,
    #[serde(rename = "Start or End", default)]
    pub start_or_end: Option<String>,
    #[serde(rename = "VDS_CD", default)]
    pub vds_cd: Option<String>,
    #[serde(default)]
    pub count: Option<f64>,
    #[serde(rename = "SPD_AVG", default)]
    pub spd_avg: Option<f64>,
    #[serde(rename = "TRFFCVLM", default)]
    pub trffcvlm: Option<f64>,
}

/// A road segment with its parsed line geometry and severity score.
#[derive(Debug, Clone)]
pub struct BlackSpotSegment {
    /// VDS detector code naming the segment.
    pub name: String,
    pub path: LineString<f64>,
    pub severity: f64,
    /// Raw `Start or End` marker, e.g. `"S"`, `"E"` or empty.
    pub marker: Option<String>,
    pub count: Option<f64>,
    pub speed_avg: Option<f64>,
    pub traffic_volume: Option<f64>,
}

impl TryFrom<BlackSpotRow> for BlackSpotSegment {
    type Error = anyhow::Error;

    fn try_from(row: BlackSpotRow) -> Result<Self> {
        let path = LineString::<f64>::try_from_wkt_str(&row.geometry)
            .map_err(|e| anyhow::anyhow!("Failed to parse segment WKT: {e}"))?;

        Ok(Self {
            name: row.vds_cd.unwrap_or_default(),
            path,
            severity: row.black_spot,
            marker: row.start_or_end.filter(|m| !m.trim().is_empty()),
            count: row.count,
            speed_avg: row.spd_avg,
            traffic_volume: row.trffcvlm,
        })
    }
}
