use crate::analyzers::error::AggregateError;
use crate::analyzers::types::{
    HourlyTotal, MonthlyTotal, SeasonalBasis, SeasonalRatio, WeekdayTotal, weekday_label,
};
use crate::analyzers::utility::min_max_normalize;
use crate::records::AccidentRecord;
use chrono::{Datelike, Timelike, Weekday};
use std::collections::BTreeMap;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn non_empty(records: &[AccidentRecord]) -> Result<(), AggregateError> {
    if records.is_empty() {
        Err(AggregateError::Empty)
    } else {
        Ok(())
    }
}

/// Computes the ratio for every season present in `records`, ordered by
/// season label.
pub fn seasonal_ratios(
    records: &[AccidentRecord],
    basis: SeasonalBasis,
) -> Result<Vec<SeasonalRatio>, AggregateError> {
    non_empty(records)?;

    #[derive(Default)]
    struct Acc {
        accidents: usize,
        deaths: u64,
        traffic_volume: f64,
    }

    let mut by_season: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in records {
        let acc = by_season.entry(r.season.as_str()).or_default();
        acc.accidents += 1;
        acc.deaths += u64::from(r.deaths);
        acc.traffic_volume += r.traffic_volume.unwrap_or(0.0);
    }

    let total_accidents = records.len() as f64;

    by_season
        .into_iter()
        .map(|(season, acc)| {
            let ratio = match basis {
                SeasonalBasis::DeathsPerTraffic => {
                    if acc.traffic_volume == 0.0 {
                        return Err(AggregateError::ZeroTraffic {
                            season: season.to_string(),
                        });
                    }
                    acc.deaths as f64 / acc.traffic_volume
                }
                SeasonalBasis::AccidentShare => acc.accidents as f64 / total_accidents,
            } * basis.scale();

            Ok(SeasonalRatio {
                season: season.to_string(),
                accidents: acc.accidents,
                deaths: acc.deaths,
                traffic_volume: acc.traffic_volume,
                ratio,
            })
        })
        .collect()
}

/// Buckets deaths by calendar month.
///
/// Every month between the earliest and latest occurrence is present; months
/// without accidents carry zero deaths.
pub fn monthly_totals(records: &[AccidentRecord]) -> Result<Vec<MonthlyTotal>, AggregateError> {
    non_empty(records)?;

    let month_index = |r: &AccidentRecord| r.occurred_at.year() * 12 + r.occurred_at.month0() as i32;

    let mut deaths: BTreeMap<i32, u64> = BTreeMap::new();
    for r in records {
        *deaths.entry(month_index(r)).or_default() += u64::from(r.deaths);
    }

    let (first, last) = match (deaths.keys().next(), deaths.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(AggregateError::Empty),
    };

    Ok((first..=last)
        .map(|idx| MonthlyTotal {
            year: idx.div_euclid(12),
            month: idx.rem_euclid(12) as u32 + 1,
            deaths: deaths.get(&idx).copied().unwrap_or(0),
        })
        .collect())
}

/// Buckets deaths by weekday, sorted by deaths descending.
///
/// All seven weekdays are always present; ties keep Monday-first order.
pub fn weekday_totals(records: &[AccidentRecord]) -> Result<Vec<WeekdayTotal>, AggregateError> {
    non_empty(records)?;

    let mut deaths = [0u64; 7];
    for r in records {
        deaths[r.occurred_at.weekday().num_days_from_monday() as usize] += u64::from(r.deaths);
    }

    let mut totals: Vec<WeekdayTotal> = WEEK
        .iter()
        .zip(deaths)
        .map(|(&weekday, deaths)| WeekdayTotal {
            weekday,
            label: weekday_label(weekday),
            deaths,
        })
        .collect();

    totals.sort_by(|a, b| b.deaths.cmp(&a.deaths));
    Ok(totals)
}

/// Buckets deaths by hour of day for the hours present in `records`, with
/// each bucket min-max normalized across the series.
pub fn hourly_totals(records: &[AccidentRecord]) -> Result<Vec<HourlyTotal>, AggregateError> {
    non_empty(records)?;

    let mut deaths: BTreeMap<u32, u64> = BTreeMap::new();
    for r in records {
        *deaths.entry(r.occurred_at.hour()).or_default() += u64::from(r.deaths);
    }

    let raw: Vec<f64> = deaths.values().map(|&d| d as f64).collect();
    let normalized = min_max_normalize("hourly deaths", &raw)?;

    Ok(deaths
        .into_iter()
        .zip(normalized)
        .map(|((hour, deaths), normalized)| HourlyTotal {
            hour,
            deaths,
            normalized,
        })
        .collect())
}
