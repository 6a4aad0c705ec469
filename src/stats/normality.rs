//! Normality tests
//!
//! Two goodness-of-fit checks against the normal distribution, both built
//! from closed-form approximations with tabulated critical values so that
//! verdicts are deterministic.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Minimum sample size below which a verdict is not attempted
const MIN_SAMPLE: usize = 8;

/// Chi-squared critical value at alpha = 0.05 for 2 degrees of freedom,
/// used by the Jarque-Bera test
const JB_CRITICAL: f64 = 5.991;

/// Result of one normality test on one column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalityVerdict {
    pub test: String,
    pub statistic: f64,
    pub critical_value: f64,
    pub is_normal: bool,
}

/// Jarque-Bera statistic from sample size, skewness and excess kurtosis:
/// `n/6 · (S² + K²/4)`. Returns `None` below the minimum sample size.
pub fn jarque_bera(n: usize, skewness: f64, excess_kurtosis: f64) -> Option<NormalityVerdict> {
    if n < MIN_SAMPLE {
        return None;
    }
    let statistic =
        n as f64 / 6.0 * (skewness.powi(2) + excess_kurtosis.powi(2) / 4.0);
    Some(NormalityVerdict {
        test: "jarque_bera".to_string(),
        statistic,
        critical_value: JB_CRITICAL,
        is_normal: statistic <= JB_CRITICAL,
    })
}

/// Chi-squared goodness-of-fit against a normal distribution with the
/// sample mean and standard deviation. Bin count is `sqrt(n)` clamped to
/// [4, 20]; expected frequencies come from the normal CDF. Returns `None`
/// when the sample is too small or has zero variance.
pub fn chi_square_gof(values: &[f64], mean: f64, std: f64) -> Option<NormalityVerdict> {
    let n = values.len();
    if n < MIN_SAMPLE || std < 1e-12 {
        return None;
    }

    let n_bins = ((n as f64).sqrt() as usize).clamp(4, 20);

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let min = sorted[0];
    let max = sorted[n - 1];
    let width = (max - min) / n_bins as f64;
    if width <= 0.0 {
        return None;
    }

    let mut observed = vec![0usize; n_bins];
    for &v in values {
        let bin = (((v - min) / width).floor() as usize).min(n_bins - 1);
        observed[bin] += 1;
    }

    let mut statistic = 0.0;
    for (i, &obs) in observed.iter().enumerate() {
        let lo = min + i as f64 * width;
        let hi = lo + width;
        // Edge bins absorb the tails so expected frequencies sum to n
        let p_lo = if i == 0 { 0.0 } else { normal_cdf(lo, mean, std) };
        let p_hi = if i == n_bins - 1 {
            1.0
        } else {
            normal_cdf(hi, mean, std)
        };
        let expected = (p_hi - p_lo).max(1e-10) * n as f64;
        statistic += (obs as f64 - expected).powi(2) / expected;
    }

    // Degrees of freedom: bins − 1 − 2 estimated parameters
    let df = n_bins.saturating_sub(3).max(1);
    let critical_value = chi_square_critical(df);

    Some(NormalityVerdict {
        test: "chi_square_gof".to_string(),
        statistic,
        critical_value,
        is_normal: statistic <= critical_value,
    })
}

/// Standard normal CDF via the Abramowitz-Stegun erf approximation
fn normal_cdf(x: f64, mean: f64, std: f64) -> f64 {
    let z = (x - mean) / (std * std::f64::consts::SQRT_2);
    0.5 * (1.0 + erf(z))
}

fn erf(x: f64) -> f64 {
    // Abramowitz & Stegun 7.1.26, max error 1.5e-7
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + 0.3275911 * x);
    let y = 1.0
        - (((((1.061405429 * t - 1.453152027) * t) + 1.421413741) * t - 0.284496736) * t
            + 0.254829592)
            * t
            * (-x * x).exp();
    sign * y
}

/// Chi-squared critical value at alpha = 0.05 via the Wilson-Hilferty
/// approximation
fn chi_square_critical(df: usize) -> f64 {
    let df = df as f64;
    let z_95 = 1.6449; // standard normal 95th percentile
    let term = 1.0 - 2.0 / (9.0 * df) + z_95 * (2.0 / (9.0 * df)).sqrt();
    df * term.powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jarque_bera_symmetric_sample() {
        // Skewness 0, excess kurtosis 0 gives statistic 0
        let verdict = jarque_bera(100, 0.0, 0.0).unwrap();
        assert_eq!(verdict.statistic, 0.0);
        assert!(verdict.is_normal);
    }

    #[test]
    fn test_jarque_bera_skewed_sample() {
        let verdict = jarque_bera(1000, 2.0, 6.0).unwrap();
        assert!(!verdict.is_normal);
    }

    #[test]
    fn test_jarque_bera_small_sample() {
        assert!(jarque_bera(5, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_chi_square_rejects_uniform() {
        let values: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / values.len() as f64)
            .sqrt();
        let verdict = chi_square_gof(&values, mean, std).unwrap();
        assert!(!verdict.is_normal);
    }

    /// Inverse standard normal CDF by bisection on `normal_cdf`
    fn normal_quantile(p: f64) -> f64 {
        let (mut lo, mut hi) = (-8.0, 8.0);
        for _ in 0..80 {
            let mid = (lo + hi) / 2.0;
            if normal_cdf(mid, 0.0, 1.0) < p {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        (lo + hi) / 2.0
    }

    #[test]
    fn test_chi_square_accepts_bell_shape() {
        // Exact normal quantiles form an ideally normal sample
        let n = 1000;
        let values: Vec<f64> = (0..n)
            .map(|i| 10.0 + 2.0 * normal_quantile((i as f64 + 0.5) / n as f64))
            .collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / values.len() as f64)
            .sqrt();
        let verdict = chi_square_gof(&values, mean, std).unwrap();
        assert!(verdict.is_normal);
    }

    #[test]
    fn test_chi_square_zero_variance() {
        let values = vec![3.0; 100];
        assert!(chi_square_gof(&values, 3.0, 0.0).is_none());
    }

    #[test]
    fn test_erf_reference_values() {
        assert!((erf(0.0)).abs() < 1e-7);
        assert!((erf(1.0) - 0.8427).abs() < 1e-3);
        assert!((erf(-1.0) + 0.8427).abs() < 1e-3);
    }

    #[test]
    fn test_chi_square_critical_monotone() {
        assert!(chi_square_critical(5) < chi_square_critical(10));
        // df=2 should be near the tabulated 5.991
        assert!((chi_square_critical(2) - 5.991).abs() < 0.3);
    }
}
