//! EDA Engine - Automated exploratory data analysis
//!
//! This crate turns a tabular dataset into a structured analysis report:
//! - Data quality scoring (the Data Reliability Index)
//! - Semantic schema inference with key and relationship detection
//! - Per-column distribution and frequency statistics
//! - Pairwise correlation and multicollinearity analysis
//! - ML-readiness assessment with leakage and imbalance checks
//!
//! # Modules
//!
//! ## Analysis Phases
//! - [`quality`] - DRI components, grades and quality issues
//! - [`profile`] - Semantic type inference, keys, relationships
//! - [`stats`] - Numeric moments, normality tests, category frequencies
//! - [`correlation`] - Pearson/Spearman/Cramér's V/eta, VIF
//! - [`readiness`] - Feature quality, target health, leakage, imbalance
//!
//! ## Pipeline
//! - [`dataset`] - In-memory columnar data model and file loaders
//! - [`report`] - Phase orchestration, executive summary, report store
//! - [`config`] - All tunable thresholds in one place
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```
//! use eda_engine::prelude::*;
//!
//! let dataset = Dataset::new(vec![
//!     DataColumn::numeric("amount", (0..100).map(|i| Some(i as f64)).collect()),
//!     DataColumn::text("segment", (0..100).map(|i| if i % 2 == 0 { "a" } else { "b" }).collect()),
//! ])?;
//!
//! let report = EdaAnalyzer::new(AnalysisConfig::default()).analyze(&dataset, None)?;
//! assert!(report.summary.dri > 0.0);
//! # Ok::<(), eda_engine::EdaError>(())
//! ```

pub mod error;

pub mod config;
pub mod dataset;

pub mod correlation;
pub mod profile;
pub mod quality;
pub mod readiness;
pub mod report;
pub mod stats;

pub use error::{EdaError, Result};

/// Common imports for typical usage
pub mod prelude {
    pub use crate::config::AnalysisConfig;
    pub use crate::correlation::{CorrelationAnalyzer, CorrelationReport, Strength};
    pub use crate::dataset::{DataColumn, Dataset, DatasetLoader, Value};
    pub use crate::error::{EdaError, Result};
    pub use crate::profile::{SemanticType, StructuralAnalyzer, StructureReport};
    pub use crate::quality::{Grade, QualityAssessor, QualityReport};
    pub use crate::readiness::{ImbalanceSeverity, MlReadinessAssessor, MlReadinessReport};
    pub use crate::report::{AnalysisReport, EdaAnalyzer, ReportStore};
    pub use crate::stats::{StatisticalAnalyzer, StatisticalReport};
}
