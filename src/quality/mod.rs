//! Data quality assessment
//!
//! Computes the Data Reliability Index (DRI): a 0-100 composite of eight
//! weighted component scores with a letter grade and a list of
//! human-readable issues for every component below the alert threshold.

use crate::config::AnalysisConfig;
use crate::dataset::{sample_indices, DataColumn, Dataset, Value};
use crate::profile::patterns;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fixed component weights; they sum to 1.0.
const W_MISSINGNESS: f64 = 0.20;
const W_DUPLICATES: f64 = 0.15;
const W_OUTLIERS: f64 = 0.15;
const W_TYPE_CONSISTENCY: f64 = 0.15;
const W_CATEGORY_BALANCE: f64 = 0.10;
const W_DATE_CONSISTENCY: f64 = 0.10;
const W_HIGH_CARDINALITY: f64 = 0.10;
const W_ZERO_VARIANCE: f64 = 0.05;

/// Letter grade derived from a 0-100 score by fixed thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// A >= 90, B >= 75, C >= 60, D >= 40, else F
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 75.0 {
            Grade::B
        } else if score >= 60.0 {
            Grade::C
        } else if score >= 40.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

/// The eight named component scores, each in [0, 100]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentScores {
    pub missingness: f64,
    pub duplicates: f64,
    pub outliers: f64,
    pub type_consistency: f64,
    pub category_balance: f64,
    pub date_consistency: f64,
    pub high_cardinality: f64,
    pub zero_variance: f64,
}

impl ComponentScores {
    /// Fixed-weight average of the eight components
    pub fn weighted_average(&self) -> f64 {
        self.missingness * W_MISSINGNESS
            + self.duplicates * W_DUPLICATES
            + self.outliers * W_OUTLIERS
            + self.type_consistency * W_TYPE_CONSISTENCY
            + self.category_balance * W_CATEGORY_BALANCE
            + self.date_consistency * W_DATE_CONSISTENCY
            + self.high_cardinality * W_HIGH_CARDINALITY
            + self.zero_variance * W_ZERO_VARIANCE
    }
}

/// Output of the quality assessment phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Data Reliability Index in [0, 100]
    pub dri: f64,
    pub grade: Grade,
    pub components: ComponentScores,
    pub issues: Vec<String>,
    pub n_rows: usize,
    pub n_cols: usize,
    /// Set when duplicate detection ran on a deterministic sample
    pub sampled_rows: Option<usize>,
}

impl QualityReport {
    /// Defined report for a dataset with no rows or no columns
    pub fn no_data(n_rows: usize, n_cols: usize) -> Self {
        Self {
            dri: 0.0,
            grade: Grade::F,
            components: ComponentScores {
                missingness: 0.0,
                duplicates: 0.0,
                outliers: 0.0,
                type_consistency: 0.0,
                category_balance: 0.0,
                date_consistency: 0.0,
                high_cardinality: 0.0,
                zero_variance: 0.0,
            },
            issues: vec!["Dataset contains no data".to_string()],
            n_rows,
            n_cols,
            sampled_rows: None,
        }
    }
}

/// Coarse per-cell kind used for type-consistency scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CellKind {
    Date,
    Numeric,
    Boolean,
    Text,
}

fn cell_kind(value: &Value) -> CellKind {
    if let Some(text) = value.as_text() {
        if patterns::DATE_FORMATS
            .iter()
            .chain(patterns::DATETIME_FORMATS)
            .any(|f| patterns::matches_date_format(text, f))
        {
            return CellKind::Date;
        }
    }
    if patterns::is_numeric_like(value) {
        CellKind::Numeric
    } else if patterns::is_boolean_like(value) {
        CellKind::Boolean
    } else {
        CellKind::Text
    }
}

/// Computes the DRI and its component scores
pub struct QualityAssessor {
    config: AnalysisConfig,
}

impl QualityAssessor {
    /// Create an assessor with the given thresholds
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Assess the dataset. Never fails; an empty dataset yields the
    /// defined "no data" report.
    pub fn assess(&self, dataset: &Dataset) -> QualityReport {
        let n_rows = dataset.n_rows();
        let n_cols = dataset.n_cols();

        if n_rows == 0 || n_cols == 0 {
            return QualityReport::no_data(n_rows, n_cols);
        }

        let (duplicates, sampled_rows) = self.duplicates_score(dataset);

        let components = ComponentScores {
            missingness: self.missingness_score(dataset),
            duplicates,
            outliers: self.outliers_score(dataset),
            type_consistency: self.type_consistency_score(dataset),
            category_balance: self.category_balance_score(dataset),
            date_consistency: self.date_consistency_score(dataset),
            high_cardinality: self.high_cardinality_score(dataset),
            zero_variance: self.zero_variance_score(dataset),
        };

        let dri = components.weighted_average().clamp(0.0, 100.0);
        let issues = self.collect_issues(&components);

        QualityReport {
            dri,
            grade: Grade::from_score(dri),
            components,
            issues,
            n_rows,
            n_cols,
            sampled_rows,
        }
    }

    /// 100 × (1 − mean missing fraction across columns)
    fn missingness_score(&self, dataset: &Dataset) -> f64 {
        let n_rows = dataset.n_rows() as f64;
        let mean_missing = dataset
            .columns()
            .iter()
            .map(|c| c.null_count() as f64 / n_rows)
            .sum::<f64>()
            / dataset.n_cols() as f64;
        (100.0 * (1.0 - mean_missing)).clamp(0.0, 100.0)
    }

    /// 100 × distinct rows / total rows, by exact value-tuple equality.
    /// Falls back to a stride sample above the configured row cap.
    fn duplicates_score(&self, dataset: &Dataset) -> (f64, Option<usize>) {
        let indices = sample_indices(dataset.n_rows(), self.config.max_rows_exact);
        let rows: Vec<usize> = match &indices {
            Some(idx) => idx.clone(),
            None => (0..dataset.n_rows()).collect(),
        };

        let mut seen = HashSet::with_capacity(rows.len());
        for &row in &rows {
            let mut key = String::new();
            for col in dataset.columns() {
                key.push_str(&col.values()[row].key());
                key.push('\u{1f}');
            }
            seen.insert(key);
        }

        let score = (100.0 * seen.len() as f64 / rows.len() as f64).clamp(0.0, 100.0);
        (score, indices.map(|idx| idx.len()))
    }

    /// 100 − 100 × total IQR outliers / (rows × numeric column count)
    fn outliers_score(&self, dataset: &Dataset) -> f64 {
        let numeric_cols: Vec<&DataColumn> = dataset
            .columns()
            .iter()
            .filter(|c| c.looks_numeric())
            .collect();

        if numeric_cols.is_empty() {
            return 100.0;
        }

        let total_outliers: usize = numeric_cols
            .iter()
            .map(|c| crate::stats::outlier::iqr_outlier_count(&c.numeric_values(), self.config.iqr_factor))
            .sum();

        let denom = (dataset.n_rows() * numeric_cols.len()) as f64;
        (100.0 - 100.0 * total_outliers as f64 / denom).clamp(0.0, 100.0)
    }

    /// Mean share of cells matching each column's dominant coarse kind
    fn type_consistency_score(&self, dataset: &Dataset) -> f64 {
        let mut total = 0.0;
        for col in dataset.columns() {
            let mut counts: std::collections::HashMap<CellKind, usize> =
                std::collections::HashMap::new();
            let mut non_null = 0usize;
            for v in col.values() {
                if v.is_null() {
                    continue;
                }
                non_null += 1;
                *counts.entry(cell_kind(v)).or_insert(0) += 1;
            }
            let share = if non_null == 0 {
                1.0
            } else {
                counts.values().copied().max().unwrap_or(0) as f64 / non_null as f64
            };
            total += share;
        }
        (100.0 * total / dataset.n_cols() as f64).clamp(0.0, 100.0)
    }

    /// Penalize categorical columns dominated by a single category
    fn category_balance_score(&self, dataset: &Dataset) -> f64 {
        let thr = self.config.dominance_threshold;
        let mut scores = Vec::new();

        for col in dataset.columns() {
            if !col.looks_categorical() {
                continue;
            }
            let counts = col.value_counts();
            let non_null = col.non_null_count();
            if non_null == 0 {
                continue;
            }
            let max_share =
                counts.values().copied().max().unwrap_or(0) as f64 / non_null as f64;
            let score = if max_share <= thr {
                100.0
            } else {
                100.0 * (1.0 - (max_share - thr) / (1.0 - thr))
            };
            scores.push(score.clamp(0.0, 100.0));
        }

        mean_or(&scores, 100.0)
    }

    /// Fraction of values matching a single detected format, for date-like
    /// columns
    fn date_consistency_score(&self, dataset: &Dataset) -> f64 {
        let mut scores = Vec::new();

        for col in dataset.columns() {
            let non_null = col.non_null_count();
            if non_null == 0 {
                continue;
            }
            let texts: Vec<&str> = col.values().iter().filter_map(|v| v.as_text()).collect();
            let date_cells = texts
                .iter()
                .filter(|t| {
                    patterns::DATE_FORMATS
                        .iter()
                        .chain(patterns::DATETIME_FORMATS)
                        .any(|f| patterns::matches_date_format(t, f))
                })
                .count();
            // Only columns that look date-like at all are scored
            if (date_cells as f64 / non_null as f64) < 0.5 {
                continue;
            }
            if let Some((_, rate)) = patterns::best_date_format(&texts, non_null) {
                scores.push((100.0 * rate).clamp(0.0, 100.0));
            }
        }

        mean_or(&scores, 100.0)
    }

    /// Penalize near-identifier columns masquerading as categories
    fn high_cardinality_score(&self, dataset: &Dataset) -> f64 {
        let mut scores = Vec::new();

        for col in dataset.columns() {
            let non_null = col.non_null_count();
            if non_null == 0 || col.looks_numeric() {
                continue;
            }
            let ratio = col.distinct_count() as f64 / non_null as f64;
            let score = if ratio > self.config.high_cardinality_ratio {
                100.0 * (1.0 - ratio)
            } else {
                100.0
            };
            scores.push(score.clamp(0.0, 100.0));
        }

        mean_or(&scores, 100.0)
    }

    /// Penalize constant columns (zero std or a single distinct value)
    fn zero_variance_score(&self, dataset: &Dataset) -> f64 {
        let mut scores = Vec::new();

        for col in dataset.columns() {
            let non_null = col.non_null_count();
            if non_null == 0 {
                continue;
            }
            let constant = if col.looks_numeric() {
                let values = col.numeric_values();
                std_dev(&values).map(|s| s < 1e-10).unwrap_or(false)
            } else {
                col.distinct_count() <= 1
            };
            scores.push(if constant { 0.0 } else { 100.0 });
        }

        mean_or(&scores, 100.0)
    }

    fn collect_issues(&self, components: &ComponentScores) -> Vec<String> {
        let thr = self.config.alert_threshold;
        let mut issues = Vec::new();

        let checks: [(&str, f64, &str); 8] = [
            ("missingness", components.missingness, "High proportion of missing values"),
            ("duplicates", components.duplicates, "Duplicate rows detected"),
            ("outliers", components.outliers, "Numeric columns contain many outliers"),
            ("type_consistency", components.type_consistency, "Columns mix incompatible value types"),
            ("category_balance", components.category_balance, "Categorical columns dominated by a single category"),
            ("date_consistency", components.date_consistency, "Date columns mix multiple formats"),
            ("high_cardinality", components.high_cardinality, "Near-identifier columns treated as categories"),
            ("zero_variance", components.zero_variance, "Constant columns carry no information"),
        ];

        for (name, score, text) in checks {
            if score < thr {
                issues.push(format!("{text} ({name} score {score:.1})"));
            }
        }
        issues
    }
}

fn mean_or(values: &[f64], default: f64) -> f64 {
    if values.is_empty() {
        default
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}
