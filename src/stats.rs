use chrono::NaiveDateTime;
use serde::Serialize;

use crate::records::AccidentRecord;

/// Load-time overview of an accident dataset.
#[derive(Debug, Default, Serialize)]
pub struct DatasetStats {
    pub rows: usize,
    pub first_occurrence: Option<NaiveDateTime>,
    pub last_occurrence: Option<NaiveDateTime>,

    // casualties by severity
    pub deaths: u64,
    pub serious_injuries: u64,
    pub minor_injuries: u64,
    pub reported_injuries: u64,
    pub casualties: u64,

    // field coverage
    pub with_traffic_volume: usize,
    pub with_position: usize,
}

impl DatasetStats {
    pub fn from_records(records: &[AccidentRecord]) -> Self {
        let mut s = DatasetStats {
            rows: records.len(),
            ..Default::default()
        };

        for r in records {
            s.first_occurrence = Some(match s.first_occurrence {
                Some(first) => first.min(r.occurred_at),
                None => r.occurred_at,
            });
            s.last_occurrence = Some(match s.last_occurrence {
                Some(last) => last.max(r.occurred_at),
                None => r.occurred_at,
            });

            s.deaths += u64::from(r.deaths);
            s.serious_injuries += u64::from(r.serious_injuries.unwrap_or(0));
            s.minor_injuries += u64::from(r.minor_injuries.unwrap_or(0));
            s.reported_injuries += u64::from(r.reported_injuries.unwrap_or(0));
            s.casualties += u64::from(r.casualties.unwrap_or(0));

            if r.traffic_volume.is_some() {
                s.with_traffic_volume += 1;
            }

            if r.position().is_some() {
                s.with_position += 1;
            }
        }

        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn position_pct(&self) -> f64 {
        Self::pct(self.with_position, self.rows)
    }
}
