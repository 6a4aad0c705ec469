//! Analysis configuration
//!
//! All numeric thresholds used by the analysis phases live here so that a
//! single configuration value controls each rule across the pipeline.

use serde::{Deserialize, Serialize};

/// Configuration for the full analysis pipeline.
///
/// Defaults match the documented contracts: IQR factor 1.5, z-score cutoff
/// 3.0, leakage/redundancy threshold 0.95, VIF cutoff 10, imbalance tiers
/// at 3 and 10.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Multiplier for the interquartile range in outlier bounds
    pub iqr_factor: f64,
    /// Z-score magnitude beyond which a value counts as an outlier
    pub zscore_threshold: f64,
    /// Dominant-category share above which a categorical column is penalized
    pub dominance_threshold: f64,
    /// Distinct-value ratio above which a categorical column is treated as
    /// near-identifier
    pub high_cardinality_ratio: f64,
    /// Minimum occurrences below which a category is flagged as rare
    pub rare_category_min_support: usize,
    /// Component score below which a quality issue is emitted
    pub alert_threshold: f64,
    /// Association with the target above which a feature is a leakage suspect
    pub leakage_threshold: f64,
    /// Pairwise correlation above which two features are redundant
    pub redundancy_threshold: f64,
    /// Variance inflation factor above which a feature is multicollinear
    pub vif_threshold: f64,
    /// Majority/minority ratio below which imbalance is Mild
    pub imbalance_mild_bound: f64,
    /// Majority/minority ratio above which imbalance is Severe
    pub imbalance_severe_bound: f64,
    /// Minimum viable sample size for the readiness completeness score
    pub min_viable_rows: usize,
    /// Row count above which expensive passes run on a deterministic sample
    pub max_rows_exact: usize,
    /// Column count above which pairwise correlation is truncated
    pub max_correlation_columns: usize,
    /// Fraction of values that must match a rule before the rule decides a
    /// column's semantic type
    pub type_match_rate: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            iqr_factor: 1.5,
            zscore_threshold: 3.0,
            dominance_threshold: 0.90,
            high_cardinality_ratio: 0.95,
            rare_category_min_support: 5,
            alert_threshold: 70.0,
            leakage_threshold: 0.95,
            redundancy_threshold: 0.95,
            vif_threshold: 10.0,
            imbalance_mild_bound: 3.0,
            imbalance_severe_bound: 10.0,
            min_viable_rows: 100,
            max_rows_exact: 50_000,
            max_correlation_columns: 64,
            type_match_rate: 0.90,
        }
    }
}

impl AnalysisConfig {
    /// Create a configuration with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the IQR multiplier for outlier bounds
    pub fn with_iqr_factor(mut self, factor: f64) -> Self {
        self.iqr_factor = factor.max(0.0);
        self
    }

    /// Set the z-score outlier cutoff
    pub fn with_zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = threshold.max(0.0);
        self
    }

    /// Set the quality alert threshold
    pub fn with_alert_threshold(mut self, threshold: f64) -> Self {
        self.alert_threshold = threshold.clamp(0.0, 100.0);
        self
    }

    /// Set the target-leakage association threshold
    pub fn with_leakage_threshold(mut self, threshold: f64) -> Self {
        self.leakage_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the redundant-pair correlation threshold
    pub fn with_redundancy_threshold(mut self, threshold: f64) -> Self {
        self.redundancy_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the VIF multicollinearity cutoff
    pub fn with_vif_threshold(mut self, threshold: f64) -> Self {
        self.vif_threshold = threshold.max(1.0);
        self
    }

    /// Set the row cap above which expensive passes are sampled
    pub fn with_max_rows_exact(mut self, rows: usize) -> Self {
        self.max_rows_exact = rows.max(1);
        self
    }

    /// Set the column cap for pairwise correlation
    pub fn with_max_correlation_columns(mut self, cols: usize) -> Self {
        self.max_correlation_columns = cols.max(2);
        self
    }

    /// Set the match rate required for a typing rule to decide
    pub fn with_type_match_rate(mut self, rate: f64) -> Self {
        self.type_match_rate = rate.clamp(0.5, 1.0);
        self
    }
}
