//! Per-column statistical characterization
//!
//! Distribution statistics for numeric columns (moments, outlier counts,
//! normality verdicts) and frequency statistics for categorical columns
//! (cardinality, entropy, dominance, rare categories). Degenerate columns
//! record "not applicable" fields instead of NaN.

pub mod normality;
pub mod outlier;

use crate::config::AnalysisConfig;
use crate::dataset::{DataColumn, Dataset};
use crate::profile::{SemanticType, StructureReport};
use normality::NormalityVerdict;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Distribution statistics for one numeric column. Moment fields are
/// `None` when mathematically undefined for the column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericSummary {
    pub name: String,
    /// Non-missing value count; always <= row count
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// `None` with fewer than two non-missing values
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Third standardized moment; `None` when std is zero or undefined
    pub skewness: Option<f64>,
    /// Fourth standardized moment minus 3; same applicability as skewness
    pub kurtosis_excess: Option<f64>,
    /// Canonical IQR-rule outlier count
    pub outlier_count: usize,
    /// Secondary |z| > threshold count, for cross-validation
    pub outlier_count_zscore: usize,
    pub normality: Vec<NormalityVerdict>,
}

impl NumericSummary {
    /// Whether any normality test rejected this column
    pub fn is_non_normal(&self) -> bool {
        self.normality.iter().any(|v| !v.is_normal)
    }
}

/// Frequency statistics for one categorical column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub name: String,
    pub count: usize,
    /// Number of distinct categories
    pub cardinality: usize,
    /// Shannon entropy of the category-frequency distribution, in bits
    pub entropy: f64,
    pub dominant_category: Option<String>,
    pub dominant_share: f64,
    /// Categories whose count falls below the minimum support
    pub rare_categories: Vec<String>,
    pub has_rare_categories: bool,
}

/// Output of the statistical analysis phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticalReport {
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
    /// Dataset-level quality flags derived from the summaries
    pub flags: Vec<String>,
}

impl StatisticalReport {
    /// Look up a numeric summary by column name
    pub fn numeric_summary(&self, name: &str) -> Option<&NumericSummary> {
        self.numeric.iter().find(|s| s.name == name)
    }

    /// Look up a categorical summary by column name
    pub fn categorical_summary(&self, name: &str) -> Option<&CategoricalSummary> {
        self.categorical.iter().find(|s| s.name == name)
    }

    /// Number of numeric columns rejected by at least one normality test
    pub fn non_normal_count(&self) -> usize {
        self.numeric.iter().filter(|s| s.is_non_normal()).count()
    }
}

/// Computes per-column summaries and dataset-level flags
pub struct StatisticalAnalyzer {
    config: AnalysisConfig,
}

impl StatisticalAnalyzer {
    /// Create an analyzer with the given thresholds
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze every column. When a [`StructureReport`] is supplied its
    /// semantic types drive the numeric/categorical split; otherwise a
    /// naive per-column inference is used.
    pub fn analyze(
        &self,
        dataset: &Dataset,
        structure: Option<&StructureReport>,
    ) -> StatisticalReport {
        let mut numeric_cols: Vec<&DataColumn> = Vec::new();
        let mut categorical_cols: Vec<&DataColumn> = Vec::new();

        for col in dataset.columns() {
            match structure.and_then(|s| s.profile(col.name())) {
                Some(profile) => {
                    if profile.semantic_type.is_numeric() {
                        numeric_cols.push(col);
                    } else if profile.semantic_type.is_categorical() {
                        categorical_cols.push(col);
                    }
                }
                None => {
                    if col.looks_numeric() {
                        numeric_cols.push(col);
                    } else if col.looks_categorical() {
                        categorical_cols.push(col);
                    }
                }
            }
        }

        // Columns are independent; rayon preserves input order on collect
        let numeric: Vec<NumericSummary> = numeric_cols
            .par_iter()
            .map(|col| self.numeric_summary(col))
            .collect();

        let categorical: Vec<CategoricalSummary> = categorical_cols
            .par_iter()
            .map(|col| self.categorical_summary(col))
            .collect();

        let flags = self.dataset_flags(&numeric, &categorical);

        StatisticalReport {
            numeric,
            categorical,
            flags,
        }
    }

    fn numeric_summary(&self, col: &DataColumn) -> NumericSummary {
        let values = col.numeric_values();
        let count = values.len();

        if count == 0 {
            return NumericSummary {
                name: col.name().to_string(),
                count: 0,
                mean: None,
                median: None,
                std_dev: None,
                min: None,
                max: None,
                skewness: None,
                kurtosis_excess: None,
                outlier_count: 0,
                outlier_count_zscore: 0,
                normality: Vec::new(),
            };
        }

        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let median = median(&values);

        let (std_dev, skewness, kurtosis_excess) = if count < 2 {
            (None, None, None)
        } else {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();
            if std < 1e-12 {
                (Some(0.0), None, None)
            } else {
                let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
                let m4 = values.iter().map(|v| (v - mean).powi(4)).sum::<f64>() / n;
                (
                    Some(std),
                    Some(m3 / std.powi(3)),
                    Some(m4 / std.powi(4) - 3.0),
                )
            }
        };

        let outlier_count = outlier::iqr_outlier_count(&values, self.config.iqr_factor);
        let outlier_count_zscore =
            outlier::zscore_outlier_count(&values, self.config.zscore_threshold);

        let mut verdicts = Vec::new();
        if let (Some(std), Some(skew), Some(kurt)) = (std_dev, skewness, kurtosis_excess) {
            if let Some(v) = normality::jarque_bera(count, skew, kurt) {
                verdicts.push(v);
            }
            if let Some(v) = normality::chi_square_gof(&values, mean, std) {
                verdicts.push(v);
            }
        }

        NumericSummary {
            name: col.name().to_string(),
            count,
            mean: Some(mean),
            median: Some(median),
            std_dev,
            min: Some(min),
            max: Some(max),
            skewness,
            kurtosis_excess,
            outlier_count,
            outlier_count_zscore,
            normality: verdicts,
        }
    }

    fn categorical_summary(&self, col: &DataColumn) -> CategoricalSummary {
        let counts = col.value_counts();
        let total: usize = counts.values().sum();
        let cardinality = counts.len();

        let entropy = if total == 0 {
            0.0
        } else {
            counts
                .values()
                .map(|&c| {
                    let p = c as f64 / total as f64;
                    -p * p.log2()
                })
                .sum()
        };

        let dominant = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(label, &c)| (label.clone(), c));

        let (dominant_category, dominant_share) = match dominant {
            Some((label, c)) if total > 0 => (Some(label), c as f64 / total as f64),
            _ => (None, 0.0),
        };

        let rare_categories: Vec<String> = counts
            .iter()
            .filter(|(_, &c)| c < self.config.rare_category_min_support)
            .map(|(label, _)| label.clone())
            .collect();
        let has_rare_categories = !rare_categories.is_empty();

        CategoricalSummary {
            name: col.name().to_string(),
            count: total,
            cardinality,
            entropy,
            dominant_category,
            dominant_share,
            rare_categories,
            has_rare_categories,
        }
    }

    fn dataset_flags(
        &self,
        numeric: &[NumericSummary],
        categorical: &[CategoricalSummary],
    ) -> Vec<String> {
        let mut flags = Vec::new();

        let non_normal = numeric.iter().filter(|s| s.is_non_normal()).count();
        if non_normal > 0 {
            flags.push(format!("{non_normal} non-normal distributions"));
        }

        let skewed = numeric
            .iter()
            .filter(|s| s.skewness.map(|v| v.abs() > 1.0).unwrap_or(false))
            .count();
        if skewed > 0 {
            flags.push(format!("{skewed} heavily skewed columns"));
        }

        let with_outliers = numeric.iter().filter(|s| s.outlier_count > 0).count();
        if with_outliers > 0 {
            flags.push(format!("{with_outliers} columns with outliers"));
        }

        let with_rare = categorical
            .iter()
            .filter(|s| s.has_rare_categories)
            .count();
        if with_rare > 0 {
            flags.push(format!("{with_rare} columns with rare categories"));
        }

        flags
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
