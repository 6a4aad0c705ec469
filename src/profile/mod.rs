//! Structural analysis: semantic schema inference
//!
//! Infers a semantic type per column from a fixed, priority-ordered set of
//! predicate rules (identifier > boolean > date/time > numeric-metric >
//! categorical > free text), detects primary-key candidates and scans for
//! relationship (foreign-key style) candidates between columns.

pub mod patterns;

use crate::config::AnalysisConfig;
use crate::dataset::{DataColumn, Dataset, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Inferred semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemanticType {
    Identifier,
    Boolean,
    DateTime,
    NumericMetric,
    Categorical,
    FreeText,
    Unknown,
}

impl SemanticType {
    /// Whether columns of this type feed numeric statistics
    pub fn is_numeric(&self) -> bool {
        matches!(self, SemanticType::NumericMetric)
    }

    /// Whether columns of this type feed categorical statistics
    pub fn is_categorical(&self) -> bool {
        matches!(self, SemanticType::Categorical | SemanticType::Boolean)
    }
}

/// Per-column inference result with supporting evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub semantic_type: SemanticType,
    /// Match rate of the decisive rule, in [0, 1]
    pub confidence: f64,
    /// Distinct non-missing values over non-missing count
    pub uniqueness_ratio: f64,
    /// Fraction of values matching the decisive value pattern
    pub pattern_match_rate: f64,
    /// Fraction of missing cells
    pub missing_ratio: f64,
    /// Detected date format, for date/time columns
    pub date_format: Option<String>,
}

/// A detected relationship candidate between two columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipCandidate {
    /// Referencing column (the `*_id`-style side)
    pub from: String,
    /// Referenced column
    pub to: String,
    /// Fraction of the smaller distinct-value set found in the other
    pub value_overlap: f64,
}

/// Output of the structural analysis phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureReport {
    pub profiles: Vec<ColumnProfile>,
    /// Columns with distinct ratio 1.0 and no missing values, ranked by
    /// how identifier-like their name and value pattern are
    pub primary_key_candidates: Vec<String>,
    pub relationships: Vec<RelationshipCandidate>,
    /// Mean inference confidence scaled to [0, 100]
    pub schema_score: f64,
}

impl StructureReport {
    /// Look up a profile by column name
    pub fn profile(&self, name: &str) -> Option<&ColumnProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }
}

/// Rule-based semantic schema inference
pub struct StructuralAnalyzer {
    config: AnalysisConfig,
}

impl StructuralAnalyzer {
    /// Create an analyzer with the given thresholds
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Profile every column and detect key/relationship candidates
    pub fn analyze(&self, dataset: &Dataset) -> StructureReport {
        let profiles: Vec<ColumnProfile> = dataset
            .columns()
            .iter()
            .map(|col| self.profile_column(col))
            .collect();

        let primary_key_candidates = self.primary_key_candidates(dataset);
        let relationships = self.relationship_candidates(dataset);

        let schema_score = if profiles.is_empty() {
            0.0
        } else {
            100.0 * profiles.iter().map(|p| p.confidence).sum::<f64>() / profiles.len() as f64
        };

        StructureReport {
            profiles,
            primary_key_candidates,
            relationships,
            schema_score,
        }
    }

    fn profile_column(&self, col: &DataColumn) -> ColumnProfile {
        let n = col.len();
        let non_null = col.non_null_count();
        let missing_ratio = if n > 0 {
            (n - non_null) as f64 / n as f64
        } else {
            0.0
        };

        if non_null == 0 {
            return ColumnProfile {
                name: col.name().to_string(),
                semantic_type: SemanticType::Unknown,
                confidence: 0.0,
                uniqueness_ratio: 0.0,
                pattern_match_rate: 0.0,
                missing_ratio,
                date_format: None,
            };
        }

        let distinct = col.distinct_count();
        let uniqueness_ratio = distinct as f64 / non_null as f64;

        // Rules are evaluated in fixed priority order; the first rule that
        // fires decides the type, and its match rate is the confidence.

        // 1. Identifier: near-unique values plus an ID-like name or pattern
        if uniqueness_ratio >= 0.99 {
            let id_name = patterns::is_id_like_name(col.name());
            let ints: Vec<i64> = col
                .values()
                .iter()
                .filter_map(|v| match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })
                .collect();
            let sequential = ints.len() == non_null && patterns::is_sequential(&ints);
            let uuid_rate = self.match_rate(col, |v| {
                v.as_text().map(patterns::is_uuid).unwrap_or(false)
            });

            if id_name || sequential || uuid_rate >= self.config.type_match_rate {
                return ColumnProfile {
                    name: col.name().to_string(),
                    semantic_type: SemanticType::Identifier,
                    confidence: uniqueness_ratio.min(1.0),
                    uniqueness_ratio,
                    pattern_match_rate: if sequential { 1.0 } else { uuid_rate.max(0.0) },
                    missing_ratio,
                    date_format: None,
                };
            }
        }

        // 2. Boolean: at most two distinct values from the boolean vocabulary
        if distinct <= 2 {
            let rate = self.match_rate(col, patterns::is_boolean_like);
            if rate >= self.config.type_match_rate {
                return ColumnProfile {
                    name: col.name().to_string(),
                    semantic_type: SemanticType::Boolean,
                    confidence: rate,
                    uniqueness_ratio,
                    pattern_match_rate: rate,
                    missing_ratio,
                    date_format: None,
                };
            }
        }

        // 3. Date/time: enough values parse under one fixed format
        if let Some((format, rate)) = self.best_date_format(col) {
            if rate >= self.config.type_match_rate {
                return ColumnProfile {
                    name: col.name().to_string(),
                    semantic_type: SemanticType::DateTime,
                    confidence: rate,
                    uniqueness_ratio,
                    pattern_match_rate: rate,
                    missing_ratio,
                    date_format: Some(format),
                };
            }
        }

        // 4. Numeric metric: enough values are, or parse as, numbers
        let numeric_rate = self.match_rate(col, patterns::is_numeric_like);
        if numeric_rate >= self.config.type_match_rate {
            return ColumnProfile {
                name: col.name().to_string(),
                semantic_type: SemanticType::NumericMetric,
                confidence: numeric_rate,
                uniqueness_ratio,
                pattern_match_rate: numeric_rate,
                missing_ratio,
                date_format: None,
            };
        }

        // 5. Categorical: bounded distinct-value count relative to rows
        if distinct <= 20 || uniqueness_ratio <= 0.2 {
            return ColumnProfile {
                name: col.name().to_string(),
                semantic_type: SemanticType::Categorical,
                confidence: (1.0 - uniqueness_ratio).clamp(0.0, 1.0),
                uniqueness_ratio,
                pattern_match_rate: 1.0 - uniqueness_ratio,
                missing_ratio,
                date_format: None,
            };
        }

        // 6. Free text: default for unstructured string data
        let text_rate = self.match_rate(col, |v| matches!(v, Value::Text(_)));
        if text_rate > 0.0 {
            return ColumnProfile {
                name: col.name().to_string(),
                semantic_type: SemanticType::FreeText,
                confidence: text_rate,
                uniqueness_ratio,
                pattern_match_rate: text_rate,
                missing_ratio,
                date_format: None,
            };
        }

        ColumnProfile {
            name: col.name().to_string(),
            semantic_type: SemanticType::Unknown,
            confidence: 0.0,
            uniqueness_ratio,
            pattern_match_rate: 0.0,
            missing_ratio,
            date_format: None,
        }
    }

    /// Fraction of non-missing values satisfying a predicate
    fn match_rate(&self, col: &DataColumn, pred: impl Fn(&Value) -> bool) -> f64 {
        let non_null = col.non_null_count();
        if non_null == 0 {
            return 0.0;
        }
        let matches = col
            .values()
            .iter()
            .filter(|v| !v.is_null() && pred(v))
            .count();
        matches as f64 / non_null as f64
    }

    /// Best single date format and its match rate over non-missing values
    fn best_date_format(&self, col: &DataColumn) -> Option<(String, f64)> {
        let texts: Vec<&str> = col.values().iter().filter_map(|v| v.as_text()).collect();
        patterns::best_date_format(&texts, col.non_null_count())
    }

    fn primary_key_candidates(&self, dataset: &Dataset) -> Vec<String> {
        let mut candidates: Vec<(String, u32, usize)> = Vec::new();

        for (idx, col) in dataset.columns().iter().enumerate() {
            if col.null_count() > 0 || col.is_empty() {
                continue;
            }
            if col.distinct_count() != dataset.n_rows() {
                continue;
            }

            let mut score = 0u32;
            if patterns::is_id_like_name(col.name()) {
                score += 2;
            }
            let ints: Vec<i64> = col
                .values()
                .iter()
                .filter_map(|v| match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })
                .collect();
            let all_uuid = col
                .values()
                .iter()
                .all(|v| v.as_text().map(patterns::is_uuid).unwrap_or(false));
            if (ints.len() == col.len() && patterns::is_sequential(&ints)) || all_uuid {
                score += 1;
            }
            candidates.push((col.name().to_string(), score, idx));
        }

        candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        candidates.into_iter().map(|(name, _, _)| name).collect()
    }

    /// Best-effort foreign-key style scan: `<base>_id` columns whose value
    /// set overlaps another column named after the base.
    fn relationship_candidates(&self, dataset: &Dataset) -> Vec<RelationshipCandidate> {
        let mut found = Vec::new();

        for from in dataset.columns() {
            let from_lower = from.name().to_lowercase();
            let Some(base) = from_lower
                .strip_suffix("_id")
                .or_else(|| from_lower.strip_suffix("_key"))
            else {
                continue;
            };
            if base.is_empty() {
                continue;
            }

            for to in dataset.columns() {
                if to.name() == from.name() {
                    continue;
                }
                let to_lower = to.name().to_lowercase();
                if !to_lower.contains(base) {
                    continue;
                }

                let overlap = value_overlap(from, to);
                if overlap >= 0.5 {
                    found.push(RelationshipCandidate {
                        from: from.name().to_string(),
                        to: to.name().to_string(),
                        value_overlap: overlap,
                    });
                }
            }
        }

        found
    }
}

fn value_overlap(a: &DataColumn, b: &DataColumn) -> f64 {
    let set_a: HashSet<String> = a
        .values()
        .iter()
        .filter(|v| !v.is_null())
        .map(|v| v.key())
        .collect();
    let set_b: HashSet<String> = b
        .values()
        .iter()
        .filter(|v| !v.is_null())
        .map(|v| v.key())
        .collect();

    let smaller = set_a.len().min(set_b.len());
    if smaller == 0 {
        return 0.0;
    }
    let shared = set_a.intersection(&set_b).count();
    shared as f64 / smaller as f64
}
