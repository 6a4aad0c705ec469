//! Report orchestration
//!
//! Runs the five analysis phases in order (quality, structure, statistics,
//! correlation, readiness), assembles the final [`AnalysisReport`] with an
//! executive summary and prioritized recommendations, and exposes the
//! in-memory [`ReportStore`].
//!
//! The pipeline is deterministic: the same dataset, target and
//! configuration always produce a byte-identical JSON report.

mod store;

pub use store::{ReportStore, StoredReport};

use crate::config::AnalysisConfig;
use crate::correlation::{CorrelationAnalyzer, CorrelationReport};
use crate::dataset::Dataset;
use crate::error::{EdaError, Result};
use crate::profile::{StructuralAnalyzer, StructureReport};
use crate::quality::{Grade, QualityAssessor, QualityReport};
use crate::readiness::{MlReadinessAssessor, MlReadinessReport};
use crate::stats::{StatisticalAnalyzer, StatisticalReport};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Headline numbers for the whole analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub n_rows: usize,
    pub n_cols: usize,
    /// Data Reliability Index in [0, 100]
    pub dri: f64,
    pub quality_grade: Grade,
    /// Mean schema-inference confidence in [0, 100]
    pub schema_score: f64,
    pub non_normal_columns: usize,
    /// Pairwise entries labeled Strong
    pub strong_correlations: usize,
    pub multicollinear_features: usize,
    pub readiness_score: f64,
    pub readiness_grade: Grade,
}

/// Complete output of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: ExecutiveSummary,
    pub quality: QualityReport,
    pub structure: StructureReport,
    pub statistics: StatisticalReport,
    pub correlation: CorrelationReport,
    pub readiness: MlReadinessReport,
    /// Prioritized, de-duplicated action items
    pub recommendations: Vec<String>,
    pub target: Option<String>,
}

impl AnalysisReport {
    /// Serialize the report to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the full analysis pipeline
pub struct EdaAnalyzer {
    config: AnalysisConfig,
}

impl EdaAnalyzer {
    /// Create an analyzer with the given configuration
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze a dataset end to end. Fails only on structurally invalid
    /// input; every in-analysis degeneracy is recorded inside the report.
    pub fn analyze(&self, dataset: &Dataset, target: Option<&str>) -> Result<AnalysisReport> {
        if dataset.n_cols() == 0 {
            return Err(EdaError::NoColumns);
        }
        if dataset.n_rows() == 0 {
            return Err(EdaError::EmptyDataset);
        }
        if let Some(name) = target {
            if dataset.column(name).is_none() {
                return Err(EdaError::TargetNotFound(name.to_string()));
            }
        }

        info!(
            rows = dataset.n_rows(),
            cols = dataset.n_cols(),
            target = target.unwrap_or("-"),
            "starting analysis"
        );

        let quality = QualityAssessor::new(self.config.clone()).assess(dataset);
        info!(dri = quality.dri, "quality assessment complete");

        let structure = StructuralAnalyzer::new(self.config.clone()).analyze(dataset);
        info!(
            schema_score = structure.schema_score,
            key_candidates = structure.primary_key_candidates.len(),
            "structural analysis complete"
        );

        let statistics =
            StatisticalAnalyzer::new(self.config.clone()).analyze(dataset, Some(&structure));
        info!(
            numeric = statistics.numeric.len(),
            categorical = statistics.categorical.len(),
            "statistical analysis complete"
        );

        let correlation =
            CorrelationAnalyzer::new(self.config.clone()).analyze(dataset, &structure);
        info!(
            entries = correlation.entries.len(),
            redundant = correlation.redundant_pairs.len(),
            "correlation analysis complete"
        );

        let readiness = MlReadinessAssessor::new(self.config.clone()).assess(
            dataset,
            &structure,
            &statistics,
            &correlation,
            &quality,
            target,
        );
        info!(score = readiness.score, "readiness assessment complete");

        let summary = ExecutiveSummary {
            n_rows: dataset.n_rows(),
            n_cols: dataset.n_cols(),
            dri: quality.dri,
            quality_grade: quality.grade,
            schema_score: structure.schema_score,
            non_normal_columns: statistics.non_normal_count(),
            strong_correlations: correlation.strong_count(),
            multicollinear_features: correlation.multicollinearity.flagged.len(),
            readiness_score: readiness.score,
            readiness_grade: readiness.grade,
        };

        let recommendations =
            self.recommendations(&quality, &statistics, &correlation, &readiness);

        Ok(AnalysisReport {
            summary,
            quality,
            structure,
            statistics,
            correlation,
            readiness,
            recommendations,
            target: target.map(|t| t.to_string()),
        })
    }

    /// Prioritized action items: leakage and imbalance first, then data
    /// repair, then feature engineering. Each item appears at most once.
    fn recommendations(
        &self,
        quality: &QualityReport,
        statistics: &StatisticalReport,
        correlation: &CorrelationReport,
        readiness: &MlReadinessReport,
    ) -> Vec<String> {
        let mut items = Vec::new();
        let mut push = |item: &str| {
            if !items.iter().any(|existing| existing == item) {
                items.push(item.to_string());
            }
        };

        if let Some(target) = &readiness.target {
            if !target.leakage_suspects.is_empty() {
                push("Remove features strongly associated with the target before training");
            }
            if let Some(imbalance) = &target.imbalance {
                if imbalance.recommend_oversampling {
                    push("Rebalance target classes, for example by oversampling the minority class");
                }
            }
        }

        if quality.components.missingness < self.config.alert_threshold {
            push("Impute or drop columns with heavy missing data");
        }
        if quality.components.duplicates < self.config.alert_threshold {
            push("De-duplicate rows before modeling");
        }
        if statistics.numeric.iter().any(|s| s.outlier_count > 0) {
            push("Treat outliers in numeric columns");
        }
        if statistics
            .numeric
            .iter()
            .any(|s| s.skewness.map(|v| v.abs() > 1.0).unwrap_or(false))
        {
            push("Transform heavily skewed numeric columns");
        }
        if !correlation.redundant_pairs.is_empty()
            || !correlation.multicollinearity.flagged.is_empty()
        {
            push("Drop one feature from each highly correlated pair");
        }
        if readiness.features.iter().any(|f| f.variance_score == 0.0) {
            push("Remove constant columns");
        }
        if quality.components.zero_variance < 100.0 {
            push("Remove constant columns");
        }

        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataColumn;

    fn analyzer() -> EdaAnalyzer {
        EdaAnalyzer::new(AnalysisConfig::default())
    }

    fn mixed_dataset() -> Dataset {
        Dataset::new(vec![
            DataColumn::ints("user_id", (1..=120).collect()),
            DataColumn::numeric("amount", (0..120).map(|i| Some((i % 37) as f64 * 1.5)).collect()),
            DataColumn::text(
                "segment",
                (0..120)
                    .map(|i| match i % 3 {
                        0 => "retail",
                        1 => "smb",
                        _ => "enterprise",
                    })
                    .collect(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_full_pipeline_runs() {
        let report = analyzer().analyze(&mixed_dataset(), None).unwrap();
        assert_eq!(report.summary.n_rows, 120);
        assert_eq!(report.summary.n_cols, 3);
        assert!(report.summary.dri > 0.0);
        assert!(report.target.is_none());
    }

    #[test]
    fn test_empty_dataset_is_input_error() {
        let ds = Dataset::new(vec![]).unwrap();
        assert!(matches!(
            analyzer().analyze(&ds, None),
            Err(EdaError::NoColumns)
        ));

        let ds = Dataset::new(vec![DataColumn::numeric("x", vec![])]).unwrap();
        assert!(matches!(
            analyzer().analyze(&ds, None),
            Err(EdaError::EmptyDataset)
        ));
    }

    #[test]
    fn test_unknown_target_is_input_error() {
        let err = analyzer()
            .analyze(&mixed_dataset(), Some("missing"))
            .unwrap_err();
        assert!(matches!(err, EdaError::TargetNotFound(_)));
    }

    #[test]
    fn test_report_is_idempotent() {
        let ds = mixed_dataset();
        let a = analyzer().analyze(&ds, Some("segment")).unwrap();
        let b = analyzer().analyze(&ds, Some("segment")).unwrap();
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn test_recommendations_deduplicated() {
        let ds = Dataset::new(vec![
            DataColumn::numeric("const_a", vec![Some(1.0); 100]),
            DataColumn::numeric("const_b", vec![Some(2.0); 100]),
            DataColumn::numeric("x", (0..100).map(|i| Some((i % 9) as f64)).collect()),
        ])
        .unwrap();

        let report = analyzer().analyze(&ds, None).unwrap();
        let constant_items = report
            .recommendations
            .iter()
            .filter(|r| r.contains("constant"))
            .count();
        assert_eq!(constant_items, 1);
    }

    #[test]
    fn test_leakage_recommendation_comes_first() {
        let target: Vec<Option<f64>> = (0..150).map(|i| Some(((i % 30) * 3) as f64)).collect();
        let leak: Vec<Option<f64>> = target.iter().map(|v| v.map(|x| x * 0.5 - 2.0)).collect();
        let ds = Dataset::new(vec![
            DataColumn::numeric("y", target),
            DataColumn::numeric("leak", leak),
        ])
        .unwrap();

        let report = analyzer().analyze(&ds, Some("y")).unwrap();
        assert!(report.recommendations[0].contains("associated with the target"));
    }

    #[test]
    fn test_summary_counts_match_sections() {
        let report = analyzer().analyze(&mixed_dataset(), None).unwrap();
        assert_eq!(
            report.summary.non_normal_columns,
            report.statistics.non_normal_count()
        );
        assert_eq!(
            report.summary.strong_correlations,
            report.correlation.strong_count()
        );
    }
}
