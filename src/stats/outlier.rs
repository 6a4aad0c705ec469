//! Outlier counting over clean numeric slices
//!
//! The IQR rule is the canonical outlier definition across the whole
//! pipeline; the z-score count is reported alongside it for
//! cross-validation, never merged into it.

use std::cmp::Ordering;

/// Lower and upper IQR bounds: [Q1 − factor·IQR, Q3 + factor·IQR].
/// Returns `None` for an empty slice.
pub fn iqr_bounds(values: &[f64], factor: f64) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let q1 = sorted[sorted.len() / 4];
    let q3 = sorted[3 * sorted.len() / 4];
    let iqr = q3 - q1;
    Some((q1 - factor * iqr, q3 + factor * iqr))
}

/// Number of values outside the IQR bounds
pub fn iqr_outlier_count(values: &[f64], factor: f64) -> usize {
    match iqr_bounds(values, factor) {
        Some((lower, upper)) => values.iter().filter(|&&v| v < lower || v > upper).count(),
        None => 0,
    }
}

/// Number of values with |z| beyond the threshold. Zero when the slice
/// has fewer than two values or zero variance.
pub fn zscore_outlier_count(values: &[f64], threshold: f64) -> usize {
    if values.len() < 2 {
        return 0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    if std < 1e-12 {
        return 0;
    }
    values
        .iter()
        .filter(|&&v| ((v - mean) / std).abs() > threshold)
        .count()
}
