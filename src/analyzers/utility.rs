use crate::analyzers::error::AggregateError;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Min-max scales `values` into `[0, 1]`.
///
/// The smallest value maps to exactly 0.0 and the largest to exactly 1.0.
/// `series` names the input in the error returned for empty or flat input.
pub fn min_max_normalize(series: &'static str, values: &[f64]) -> Result<Vec<f64>, AggregateError> {
    let (min, max) = values
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or(AggregateError::Empty)?;

    let range = max - min;
    if range == 0.0 {
        return Err(AggregateError::FlatSeries { series, value: min });
    }

    Ok(values.iter().map(|v| (v - min) / range).collect())
}
