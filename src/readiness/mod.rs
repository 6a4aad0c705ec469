//! ML-readiness assessment
//!
//! Scores how ready the dataset is for model training: per-feature
//! quality, target health (class imbalance, leakage suspects), sample
//! completeness and an estimate of how much feature engineering remains.
//! The composite score reuses the quality module's letter grades.

use crate::config::AnalysisConfig;
use crate::correlation::{correlation_ratio, cramers_v, pearson, CorrelationReport};
use crate::dataset::{DataColumn, Dataset};
use crate::profile::{SemanticType, StructureReport};
use crate::quality::{Grade, QualityReport};
use crate::stats::StatisticalReport;
use serde::{Deserialize, Serialize};

/// Composite weights. Renormalized when no target column is supplied.
const W_FEATURE_QUALITY: f64 = 0.40;
const W_TARGET: f64 = 0.30;
const W_COMPLETENESS: f64 = 0.20;
const W_ENGINEERING: f64 = 0.10;

/// Class imbalance severity from the majority/minority count ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImbalanceSeverity {
    /// Ratio below 3
    Mild,
    /// Ratio from 3 to 10
    Moderate,
    /// Ratio above 10
    Severe,
}

impl ImbalanceSeverity {
    /// Classify a majority/minority count ratio
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 10.0 {
            ImbalanceSeverity::Severe
        } else if ratio >= 3.0 {
            ImbalanceSeverity::Moderate
        } else {
            ImbalanceSeverity::Mild
        }
    }
}

/// Class imbalance diagnosis for a categorical target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImbalanceReport {
    /// Majority class count over minority class count
    pub ratio: f64,
    pub severity: ImbalanceSeverity,
    pub majority_class: String,
    pub minority_class: String,
    /// Set at Moderate severity and above
    pub recommend_oversampling: bool,
}

/// A feature whose association with the target exceeds the leakage
/// threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeakageSuspect {
    pub feature: String,
    pub association: f64,
}

/// Target-side analysis, present only when a target column was supplied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetAnalysis {
    pub name: String,
    /// Target health score in [0, 100]
    pub score: f64,
    pub imbalance: Option<ImbalanceReport>,
    pub leakage_suspects: Vec<LeakageSuspect>,
}

/// Per-feature readiness sub-scores, each in [0, 100]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureAssessment {
    pub name: String,
    pub missing_score: f64,
    pub cardinality_score: f64,
    pub variance_score: f64,
    pub outlier_score: f64,
    /// Mean of the four sub-scores
    pub score: f64,
    /// Suggested preprocessing steps for this feature
    pub transformations: Vec<String>,
}

/// Output of the ML-readiness phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlReadinessReport {
    /// Composite readiness score in [0, 100]
    pub score: f64,
    pub grade: Grade,
    pub feature_quality_score: f64,
    pub completeness_score: f64,
    pub engineering_score: f64,
    pub features: Vec<FeatureAssessment>,
    pub target: Option<TargetAnalysis>,
    pub notes: Vec<String>,
}

/// Scores dataset readiness for model training
pub struct MlReadinessAssessor {
    config: AnalysisConfig,
}

impl MlReadinessAssessor {
    /// Create an assessor with the given thresholds
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Assess readiness from the upstream phase reports. `target` must
    /// already be validated against the dataset by the caller.
    pub fn assess(
        &self,
        dataset: &Dataset,
        structure: &StructureReport,
        stats: &StatisticalReport,
        correlation: &CorrelationReport,
        quality: &QualityReport,
        target: Option<&str>,
    ) -> MlReadinessReport {
        let features: Vec<FeatureAssessment> = dataset
            .columns()
            .iter()
            .filter(|col| Some(col.name()) != target)
            .filter(|col| {
                structure
                    .profile(col.name())
                    .map(|p| p.semantic_type.is_numeric() || p.semantic_type.is_categorical())
                    .unwrap_or(false)
            })
            .map(|col| self.assess_feature(col, structure, stats))
            .collect();

        let feature_quality_score = mean_or(
            &features.iter().map(|f| f.score).collect::<Vec<f64>>(),
            0.0,
        );

        let completeness_score = self.completeness_score(dataset, quality);
        let engineering_score = self.engineering_score(stats, correlation);

        let target_analysis =
            target.map(|name| self.assess_target(name, dataset, structure));

        let score = match &target_analysis {
            Some(t) => {
                feature_quality_score * W_FEATURE_QUALITY
                    + t.score * W_TARGET
                    + completeness_score * W_COMPLETENESS
                    + engineering_score * W_ENGINEERING
            }
            None => {
                (feature_quality_score * W_FEATURE_QUALITY
                    + completeness_score * W_COMPLETENESS
                    + engineering_score * W_ENGINEERING)
                    / (W_FEATURE_QUALITY + W_COMPLETENESS + W_ENGINEERING)
            }
        }
        .clamp(0.0, 100.0);

        let notes = self.collect_notes(&features, &target_analysis, dataset);

        MlReadinessReport {
            score,
            grade: Grade::from_score(score),
            feature_quality_score,
            completeness_score,
            engineering_score,
            features,
            target: target_analysis,
            notes,
        }
    }

    fn assess_feature(
        &self,
        col: &DataColumn,
        structure: &StructureReport,
        stats: &StatisticalReport,
    ) -> FeatureAssessment {
        let name = col.name();
        let non_null = col.non_null_count();
        let missing_ratio = if col.len() == 0 {
            0.0
        } else {
            col.null_count() as f64 / col.len() as f64
        };
        let missing_score = (100.0 * (1.0 - missing_ratio)).clamp(0.0, 100.0);

        let is_numeric = structure
            .profile(name)
            .map(|p| p.semantic_type.is_numeric())
            .unwrap_or(false);

        let cardinality_score = if is_numeric || non_null == 0 {
            100.0
        } else {
            let ratio = col.distinct_count() as f64 / non_null as f64;
            if ratio > self.config.high_cardinality_ratio {
                (100.0 * (1.0 - ratio)).clamp(0.0, 100.0)
            } else {
                100.0
            }
        };

        let variance_score = if is_numeric {
            match stats.numeric_summary(name).and_then(|s| s.std_dev) {
                Some(std) if std < 1e-10 => 0.0,
                Some(_) => 100.0,
                None => 0.0,
            }
        } else if col.distinct_count() <= 1 {
            0.0
        } else {
            100.0
        };

        let outlier_score = if is_numeric && non_null > 0 {
            let outliers = stats
                .numeric_summary(name)
                .map(|s| s.outlier_count)
                .unwrap_or(0);
            (100.0 * (1.0 - outliers as f64 / non_null as f64)).clamp(0.0, 100.0)
        } else {
            100.0
        };

        let score = (missing_score + cardinality_score + variance_score + outlier_score) / 4.0;

        let transformations = self.feature_transformations(col, is_numeric, stats);

        FeatureAssessment {
            name: name.to_string(),
            missing_score,
            cardinality_score,
            variance_score,
            outlier_score,
            score,
            transformations,
        }
    }

    fn feature_transformations(
        &self,
        col: &DataColumn,
        is_numeric: bool,
        stats: &StatisticalReport,
    ) -> Vec<String> {
        let mut steps = Vec::new();

        if col.null_count() > 0 {
            steps.push("impute missing values".to_string());
        }

        if is_numeric {
            if let Some(summary) = stats.numeric_summary(col.name()) {
                if summary.skewness.map(|s| s.abs() > 1.0).unwrap_or(false) {
                    steps.push("apply log or power transform".to_string());
                }
                if summary.outlier_count > 0 {
                    steps.push("winsorize or use robust scaling".to_string());
                } else if summary.std_dev.map(|s| s > 1e-10).unwrap_or(false) {
                    steps.push("standardize before distance-based models".to_string());
                }
            }
        } else if let Some(summary) = stats.categorical_summary(col.name()) {
            if summary.cardinality > 20 {
                steps.push("use frequency or target encoding".to_string());
            } else if summary.cardinality > 1 {
                steps.push("one-hot encode".to_string());
            }
            if summary.has_rare_categories {
                steps.push("group rare categories".to_string());
            }
        }

        steps
    }

    fn assess_target(
        &self,
        name: &str,
        dataset: &Dataset,
        structure: &StructureReport,
    ) -> TargetAnalysis {
        let target_col = dataset.column(name);
        let target_is_categorical = structure
            .profile(name)
            .map(|p| p.semantic_type.is_categorical())
            .unwrap_or(false);

        let imbalance = if target_is_categorical {
            target_col.and_then(|col| self.imbalance(col))
        } else {
            None
        };

        let leakage_suspects = target_col
            .map(|col| self.leakage_suspects(col, dataset, structure))
            .unwrap_or_default();

        let base = match &imbalance {
            Some(report) => match report.severity {
                ImbalanceSeverity::Mild => 100.0,
                ImbalanceSeverity::Moderate => 60.0,
                ImbalanceSeverity::Severe => 25.0,
            },
            None => 100.0,
        };
        let score = (base - 25.0 * leakage_suspects.len() as f64).clamp(0.0, 100.0);

        TargetAnalysis {
            name: name.to_string(),
            score,
            imbalance,
            leakage_suspects,
        }
    }

    fn imbalance(&self, col: &DataColumn) -> Option<ImbalanceReport> {
        let counts = col.value_counts();
        if counts.len() < 2 {
            return None;
        }

        // BTreeMap iteration makes ties resolve to the smallest label
        let (majority_class, majority) = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(label, &c)| (label.clone(), c))?;
        let (minority_class, minority) = counts
            .iter()
            .min_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(label, &c)| (label.clone(), c))?;

        if minority == 0 {
            return None;
        }

        let ratio = majority as f64 / minority as f64;
        let severity = ImbalanceSeverity::from_ratio(ratio);

        Some(ImbalanceReport {
            ratio,
            severity,
            majority_class,
            minority_class,
            recommend_oversampling: severity != ImbalanceSeverity::Mild,
        })
    }

    fn leakage_suspects(
        &self,
        target: &DataColumn,
        dataset: &Dataset,
        structure: &StructureReport,
    ) -> Vec<LeakageSuspect> {
        let target_numeric = structure
            .profile(target.name())
            .map(|p| p.semantic_type.is_numeric())
            .unwrap_or(false);

        let mut suspects = Vec::new();
        for col in dataset.columns() {
            if col.name() == target.name() {
                continue;
            }
            let Some(profile) = structure.profile(col.name()) else {
                continue;
            };
            let feature_numeric = match profile.semantic_type {
                SemanticType::NumericMetric => true,
                SemanticType::Categorical | SemanticType::Boolean => false,
                _ => continue,
            };

            let association = match (feature_numeric, target_numeric) {
                (true, true) => {
                    let (x, y) = paired_numeric(col, target);
                    pearson(&x, &y).map(|r| r.abs())
                }
                (false, false) => {
                    let (x, y) = paired_labels(col, target);
                    cramers_v(&x, &y)
                }
                (true, false) => {
                    let (values, categories) = paired_mixed(col, target);
                    correlation_ratio(&categories, &values)
                }
                (false, true) => {
                    let (values, categories) = paired_mixed(target, col);
                    correlation_ratio(&categories, &values)
                }
            };

            if let Some(a) = association {
                if a > self.config.leakage_threshold {
                    suspects.push(LeakageSuspect {
                        feature: col.name().to_string(),
                        association: a,
                    });
                }
            }
        }
        suspects
    }

    /// Overall cell completeness, discounted when the sample is below the
    /// minimum viable row count
    fn completeness_score(&self, dataset: &Dataset, quality: &QualityReport) -> f64 {
        let base = quality.components.missingness;
        if dataset.n_rows() >= self.config.min_viable_rows {
            base
        } else {
            let factor = dataset.n_rows() as f64 / self.config.min_viable_rows as f64;
            (base * factor).clamp(0.0, 100.0)
        }
    }

    /// How little feature engineering remains: 100 when columns are ready
    /// to model as-is, lower as skew, outliers, rare categories and
    /// redundant pairs accumulate
    fn engineering_score(
        &self,
        stats: &StatisticalReport,
        correlation: &CorrelationReport,
    ) -> f64 {
        let mut score = 100.0;

        if !stats.numeric.is_empty() {
            let n = stats.numeric.len() as f64;
            let skewed = stats
                .numeric
                .iter()
                .filter(|s| s.skewness.map(|v| v.abs() > 1.0).unwrap_or(false))
                .count() as f64;
            let outliered = stats
                .numeric
                .iter()
                .filter(|s| s.outlier_count > 0)
                .count() as f64;
            score -= 30.0 * skewed / n;
            score -= 20.0 * outliered / n;
        }

        if !stats.categorical.is_empty() {
            let n = stats.categorical.len() as f64;
            let rare = stats
                .categorical
                .iter()
                .filter(|s| s.has_rare_categories)
                .count() as f64;
            score -= 20.0 * rare / n;
        }

        score -= 10.0 * correlation.redundant_pairs.len().min(2) as f64;

        score.clamp(0.0, 100.0)
    }

    fn collect_notes(
        &self,
        features: &[FeatureAssessment],
        target: &Option<TargetAnalysis>,
        dataset: &Dataset,
    ) -> Vec<String> {
        let mut notes = Vec::new();

        if dataset.n_rows() < self.config.min_viable_rows {
            notes.push(format!(
                "Sample of {} rows is below the minimum viable size of {}",
                dataset.n_rows(),
                self.config.min_viable_rows
            ));
        }

        for f in features.iter().filter(|f| f.variance_score == 0.0) {
            notes.push(format!("Feature '{}' is constant and carries no signal", f.name));
        }

        if let Some(t) = target {
            for suspect in &t.leakage_suspects {
                notes.push(format!(
                    "Feature '{}' is associated with the target at {:.3}; possible leakage",
                    suspect.feature, suspect.association
                ));
            }
            if let Some(imbalance) = &t.imbalance {
                if imbalance.recommend_oversampling {
                    notes.push(format!(
                        "Target classes are imbalanced at {:.1}:1; consider oversampling the minority class",
                        imbalance.ratio
                    ));
                }
            }
        }

        notes
    }
}

/// Rows where both columns hold numeric values
fn paired_numeric(a: &DataColumn, b: &DataColumn) -> (Vec<f64>, Vec<f64>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (va, vb) in a.values().iter().zip(b.values().iter()) {
        if let (Some(fa), Some(fb)) = (va.as_f64(), vb.as_f64()) {
            x.push(fa);
            y.push(fb);
        }
    }
    (x, y)
}

/// Rows where both columns hold non-missing labels
fn paired_labels(a: &DataColumn, b: &DataColumn) -> (Vec<String>, Vec<String>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (va, vb) in a.values().iter().zip(b.values().iter()) {
        if !va.is_null() && !vb.is_null() {
            x.push(va.label());
            y.push(vb.label());
        }
    }
    (x, y)
}

/// Rows pairing a numeric value with a categorical label
fn paired_mixed(numeric: &DataColumn, categorical: &DataColumn) -> (Vec<f64>, Vec<String>) {
    let mut values = Vec::new();
    let mut categories = Vec::new();
    for (vn, vc) in numeric.values().iter().zip(categorical.values().iter()) {
        if let (Some(f), false) = (vn.as_f64(), vc.is_null()) {
            values.push(f);
            categories.push(vc.label());
        }
    }
    (values, categories)
}

fn mean_or(values: &[f64], default: f64) -> f64 {
    if values.is_empty() {
        default
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::CorrelationAnalyzer;
    use crate::profile::StructuralAnalyzer;
    use crate::quality::QualityAssessor;
    use crate::stats::StatisticalAnalyzer;

    fn assess(dataset: &Dataset, target: Option<&str>) -> MlReadinessReport {
        let config = AnalysisConfig::default();
        let structure = StructuralAnalyzer::new(config.clone()).analyze(dataset);
        let stats = StatisticalAnalyzer::new(config.clone()).analyze(dataset, Some(&structure));
        let correlation = CorrelationAnalyzer::new(config.clone()).analyze(dataset, &structure);
        let quality = QualityAssessor::new(config.clone()).assess(dataset);
        MlReadinessAssessor::new(config).assess(
            dataset,
            &structure,
            &stats,
            &correlation,
            &quality,
            target,
        )
    }

    fn class_column(majority: usize, minority: usize) -> DataColumn {
        let mut values = vec!["yes"; majority];
        values.extend(vec!["no"; minority]);
        DataColumn::text("label", values)
    }

    #[test]
    fn test_imbalance_severity_bounds() {
        assert_eq!(ImbalanceSeverity::from_ratio(2.9), ImbalanceSeverity::Mild);
        assert_eq!(ImbalanceSeverity::from_ratio(3.0), ImbalanceSeverity::Moderate);
        assert_eq!(ImbalanceSeverity::from_ratio(4.0), ImbalanceSeverity::Moderate);
        assert_eq!(ImbalanceSeverity::from_ratio(10.0), ImbalanceSeverity::Moderate);
        assert_eq!(ImbalanceSeverity::from_ratio(10.1), ImbalanceSeverity::Severe);
    }

    #[test]
    fn test_ninety_ten_split_is_moderate() {
        let ds = Dataset::new(vec![
            DataColumn::numeric("f", (0..100).map(|i| Some((i % 17) as f64)).collect()),
            class_column(90, 10),
        ])
        .unwrap();

        let report = assess(&ds, Some("label"));
        let imbalance = report.target.unwrap().imbalance.unwrap();
        assert!((imbalance.ratio - 9.0).abs() < 1e-9);
        assert_eq!(imbalance.severity, ImbalanceSeverity::Moderate);
        assert!(imbalance.recommend_oversampling);
        assert_eq!(imbalance.majority_class, "yes");
        assert_eq!(imbalance.minority_class, "no");
    }

    #[test]
    fn test_balanced_target_no_oversampling() {
        let ds = Dataset::new(vec![
            DataColumn::numeric("f", (0..100).map(|i| Some((i % 13) as f64)).collect()),
            class_column(55, 45),
        ])
        .unwrap();

        let report = assess(&ds, Some("label"));
        let imbalance = report.target.unwrap().imbalance.unwrap();
        assert_eq!(imbalance.severity, ImbalanceSeverity::Mild);
        assert!(!imbalance.recommend_oversampling);
    }

    #[test]
    fn test_linear_copy_of_target_is_leakage() {
        let target: Vec<Option<f64>> = (0..120).map(|i| Some(((i % 25) * 2) as f64)).collect();
        let copy: Vec<Option<f64>> = target
            .iter()
            .map(|v| v.map(|x| 2.0 * x + 1.0))
            .collect();
        let ds = Dataset::new(vec![
            DataColumn::numeric("y", target),
            DataColumn::numeric("leaky", copy),
            DataColumn::numeric("honest", (0..120).map(|i| Some(((i * 7) % 31) as f64)).collect()),
        ])
        .unwrap();

        let report = assess(&ds, Some("y"));
        let target_analysis = report.target.unwrap();
        assert_eq!(target_analysis.leakage_suspects.len(), 1);
        assert_eq!(target_analysis.leakage_suspects[0].feature, "leaky");
        assert!(target_analysis.leakage_suspects[0].association > 0.95);
        assert!(report
            .notes
            .iter()
            .any(|n| n.contains("leaky") && n.contains("leakage")));
    }

    #[test]
    fn test_no_target_renormalizes_weights() {
        let ds = Dataset::new(vec![
            DataColumn::numeric("a", (0..200).map(|i| Some((i % 19) as f64)).collect()),
            DataColumn::numeric("b", (0..200).map(|i| Some(((i * 3) % 23) as f64)).collect()),
        ])
        .unwrap();

        let report = assess(&ds, None);
        assert!(report.target.is_none());

        let expected = (report.feature_quality_score * W_FEATURE_QUALITY
            + report.completeness_score * W_COMPLETENESS
            + report.engineering_score * W_ENGINEERING)
            / (W_FEATURE_QUALITY + W_COMPLETENESS + W_ENGINEERING);
        assert!((report.score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_constant_feature_scores_zero_variance() {
        let ds = Dataset::new(vec![
            DataColumn::numeric("const", vec![Some(3.0); 150]),
            DataColumn::numeric("vary", (0..150).map(|i| Some((i % 29) as f64)).collect()),
        ])
        .unwrap();

        let report = assess(&ds, None);
        let constant = report.features.iter().find(|f| f.name == "const").unwrap();
        assert_eq!(constant.variance_score, 0.0);
        assert!(report.notes.iter().any(|n| n.contains("constant")));
    }

    #[test]
    fn test_missing_values_lower_feature_score() {
        let values: Vec<Option<f64>> = (0..200)
            .map(|i| if i % 2 == 0 { Some((i % 21) as f64) } else { None })
            .collect();
        let ds = Dataset::new(vec![
            DataColumn::numeric("holey", values),
            DataColumn::numeric("full", (0..200).map(|i| Some((i % 21) as f64)).collect()),
        ])
        .unwrap();

        let report = assess(&ds, None);
        let holey = report.features.iter().find(|f| f.name == "holey").unwrap();
        let full = report.features.iter().find(|f| f.name == "full").unwrap();
        assert!((holey.missing_score - 50.0).abs() < 1e-9);
        assert!(holey.score < full.score);
        assert!(holey
            .transformations
            .iter()
            .any(|t| t.contains("impute")));
    }

    #[test]
    fn test_small_sample_discounts_completeness() {
        let ds = Dataset::new(vec![DataColumn::numeric(
            "x",
            (0..50).map(|i| Some((i % 11) as f64)).collect(),
        )])
        .unwrap();

        let report = assess(&ds, None);
        // 50 rows of 100 minimum: full completeness halved
        assert!((report.completeness_score - 50.0).abs() < 1e-9);
        assert!(report
            .notes
            .iter()
            .any(|n| n.contains("below the minimum viable size")));
    }

    #[test]
    fn test_skewed_feature_gets_transform_suggestion() {
        let values: Vec<Option<f64>> = (0..200)
            .map(|i| Some(if i % 20 == 0 { 400.0 } else { (i % 5) as f64 }))
            .collect();
        let ds = Dataset::new(vec![DataColumn::numeric("skewed", values)]).unwrap();

        let report = assess(&ds, None);
        let feature = report.features.iter().find(|f| f.name == "skewed").unwrap();
        assert!(feature
            .transformations
            .iter()
            .any(|t| t.contains("log or power")));
    }

    #[test]
    fn test_categorical_encoding_suggestions() {
        let ds = Dataset::new(vec![
            DataColumn::numeric("x", (0..120).map(|i| Some((i % 37) as f64)).collect()),
            DataColumn::text(
                "color",
                (0..120)
                    .map(|i| match i % 3 {
                        0 => "red",
                        1 => "green",
                        _ => "blue",
                    })
                    .collect(),
            ),
        ])
        .unwrap();

        let report = assess(&ds, None);
        let color = report.features.iter().find(|f| f.name == "color").unwrap();
        assert!(color
            .transformations
            .iter()
            .any(|t| t.contains("one-hot")));
    }
}
