//! Correlation and association analysis
//!
//! Pairwise association with the method fixed by the semantic types of
//! the pair: numeric-numeric gets Pearson and Spearman, categorical pairs
//! get Cramér's V, mixed pairs get the correlation ratio. Multivariate
//! redundancy is reported through variance inflation factors and
//! high-correlation pair grouping.

pub mod vif;

use crate::config::AnalysisConfig;
use crate::dataset::{sample_indices, DataColumn, Dataset};
use crate::profile::{SemanticType, StructureReport};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Association method, fixed by the pair's semantic types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
    CramersV,
    CorrelationRatio,
}

/// Categorical strength label on the absolute coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    /// Strong > 0.7, Moderate > 0.4, else Weak (absolute value)
    pub fn from_value(value: f64) -> Self {
        let v = value.abs();
        if v > 0.7 {
            Strength::Strong
        } else if v > 0.4 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }
}

/// One pairwise association entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub column_a: String,
    pub column_b: String,
    pub method: CorrelationMethod,
    pub value: f64,
    pub strength: Strength,
}

/// A pair of features correlated above the redundancy threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedundantPair {
    pub column_a: String,
    pub column_b: String,
    pub correlation: f64,
}

/// Multicollinearity diagnosis over the numeric features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MulticollinearityReport {
    /// VIF per numeric feature, omitted where undefined
    pub vif: BTreeMap<String, f64>,
    /// Features whose VIF exceeds the configured cutoff
    pub flagged: Vec<String>,
}

/// Output of the correlation analysis phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Pairwise entries in dataset column-pair order
    pub entries: Vec<CorrelationEntry>,
    pub multicollinearity: MulticollinearityReport,
    pub redundant_pairs: Vec<RedundantPair>,
    /// Set when pairwise passes ran on a deterministic row sample
    pub sampled_rows: Option<usize>,
    /// Set when the column set was truncated to the configured cap
    pub truncated_to_columns: Option<usize>,
}

impl CorrelationReport {
    /// Defined empty report for datasets with nothing to correlate
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            multicollinearity: MulticollinearityReport {
                vif: BTreeMap::new(),
                flagged: Vec::new(),
            },
            redundant_pairs: Vec::new(),
            sampled_rows: None,
            truncated_to_columns: None,
        }
    }

    /// All entries for an unordered column pair
    pub fn pair(&self, a: &str, b: &str) -> Vec<&CorrelationEntry> {
        self.entries
            .iter()
            .filter(|e| {
                (e.column_a == a && e.column_b == b) || (e.column_a == b && e.column_b == a)
            })
            .collect()
    }

    /// Number of Strong entries
    pub fn strong_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.strength == Strength::Strong)
            .count()
    }
}

/// Pairwise and multivariate association analysis
pub struct CorrelationAnalyzer {
    config: AnalysisConfig,
}

impl CorrelationAnalyzer {
    /// Create an analyzer with the given thresholds
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze associations between all profiled numeric and categorical
    /// columns. Datasets with no usable column pairs yield an empty
    /// matrix, not an error.
    pub fn analyze(&self, dataset: &Dataset, structure: &StructureReport) -> CorrelationReport {
        let mut usable: Vec<(&DataColumn, SemanticType)> = Vec::new();
        for col in dataset.columns() {
            if let Some(profile) = structure.profile(col.name()) {
                if profile.semantic_type.is_numeric() || profile.semantic_type.is_categorical() {
                    usable.push((col, profile.semantic_type));
                }
            }
        }

        let truncated_to_columns = if usable.len() > self.config.max_correlation_columns {
            usable.truncate(self.config.max_correlation_columns);
            Some(self.config.max_correlation_columns)
        } else {
            None
        };

        if usable.len() < 2 {
            let mut report = CorrelationReport::empty();
            report.truncated_to_columns = truncated_to_columns;
            return report;
        }

        let indices = sample_indices(dataset.n_rows(), self.config.max_rows_exact);
        let rows: Vec<usize> = match &indices {
            Some(idx) => idx.clone(),
            None => (0..dataset.n_rows()).collect(),
        };

        let pairs: Vec<(usize, usize)> = (0..usable.len())
            .flat_map(|i| ((i + 1)..usable.len()).map(move |j| (i, j)))
            .collect();

        let entries: Vec<CorrelationEntry> = pairs
            .par_iter()
            .map(|&(i, j)| self.pair_entries(usable[i], usable[j], &rows))
            .flatten()
            .collect();

        let redundant_pairs = entries
            .iter()
            .filter(|e| {
                e.method == CorrelationMethod::Pearson
                    && e.value.abs() > self.config.redundancy_threshold
            })
            .map(|e| RedundantPair {
                column_a: e.column_a.clone(),
                column_b: e.column_b.clone(),
                correlation: e.value,
            })
            .collect();

        let multicollinearity = self.multicollinearity(&usable, &rows);

        CorrelationReport {
            entries,
            multicollinearity,
            redundant_pairs,
            sampled_rows: indices.map(|idx| idx.len()),
            truncated_to_columns,
        }
    }

    fn pair_entries(
        &self,
        a: (&DataColumn, SemanticType),
        b: (&DataColumn, SemanticType),
        rows: &[usize],
    ) -> Vec<CorrelationEntry> {
        let (col_a, type_a) = a;
        let (col_b, type_b) = b;
        let mut entries = Vec::new();

        let mut push = |method, value: f64| {
            entries.push(CorrelationEntry {
                column_a: col_a.name().to_string(),
                column_b: col_b.name().to_string(),
                method,
                value,
                strength: Strength::from_value(value),
            });
        };

        match (type_a.is_numeric(), type_b.is_numeric()) {
            (true, true) => {
                let (x, y) = aligned_numeric(col_a, col_b, rows);
                if let Some(r) = pearson(&x, &y) {
                    push(CorrelationMethod::Pearson, r);
                }
                if let Some(r) = spearman(&x, &y) {
                    push(CorrelationMethod::Spearman, r);
                }
            }
            (false, false) => {
                let (x, y) = aligned_labels(col_a, col_b, rows);
                if let Some(v) = cramers_v(&x, &y) {
                    push(CorrelationMethod::CramersV, v);
                }
            }
            (true, false) => {
                let (values, categories) = aligned_mixed(col_a, col_b, rows);
                if let Some(eta) = correlation_ratio(&categories, &values) {
                    push(CorrelationMethod::CorrelationRatio, eta);
                }
            }
            (false, true) => {
                let (values, categories) = aligned_mixed(col_b, col_a, rows);
                if let Some(eta) = correlation_ratio(&categories, &values) {
                    push(CorrelationMethod::CorrelationRatio, eta);
                }
            }
        }

        entries
    }

    fn multicollinearity(
        &self,
        usable: &[(&DataColumn, SemanticType)],
        rows: &[usize],
    ) -> MulticollinearityReport {
        let numeric: Vec<&DataColumn> = usable
            .iter()
            .filter(|(_, t)| t.is_numeric())
            .map(|(c, _)| *c)
            .collect();

        if numeric.len() < 2 {
            return MulticollinearityReport {
                vif: BTreeMap::new(),
                flagged: Vec::new(),
            };
        }

        // Complete cases only: rows where every numeric column has a value
        let complete: Vec<usize> = rows
            .iter()
            .copied()
            .filter(|&row| numeric.iter().all(|c| c.values()[row].as_f64().is_some()))
            .collect();

        if complete.len() <= numeric.len() {
            return MulticollinearityReport {
                vif: BTreeMap::new(),
                flagged: Vec::new(),
            };
        }

        let mut data = Array2::zeros((complete.len(), numeric.len()));
        for (r, &row) in complete.iter().enumerate() {
            for (c, col) in numeric.iter().enumerate() {
                if let Some(v) = col.values()[row].as_f64() {
                    data[[r, c]] = v;
                }
            }
        }

        let names: Vec<String> = numeric.iter().map(|c| c.name().to_string()).collect();
        let vifs = vif::variance_inflation_factors(&data, &names);

        let flagged: Vec<String> = names
            .iter()
            .filter(|n| {
                vifs.get(*n)
                    .map(|v| *v > self.config.vif_threshold)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        MulticollinearityReport {
            vif: vifs,
            flagged,
        }
    }
}

/// Rows where both columns hold numeric values
fn aligned_numeric(a: &DataColumn, b: &DataColumn, rows: &[usize]) -> (Vec<f64>, Vec<f64>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for &row in rows {
        if let (Some(va), Some(vb)) = (a.values()[row].as_f64(), b.values()[row].as_f64()) {
            x.push(va);
            y.push(vb);
        }
    }
    (x, y)
}

/// Rows where both columns hold non-missing labels
fn aligned_labels(a: &DataColumn, b: &DataColumn, rows: &[usize]) -> (Vec<String>, Vec<String>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for &row in rows {
        let va = &a.values()[row];
        let vb = &b.values()[row];
        if !va.is_null() && !vb.is_null() {
            x.push(va.label());
            y.push(vb.label());
        }
    }
    (x, y)
}

/// Rows where the numeric column has a value and the categorical one a label
fn aligned_mixed(
    numeric: &DataColumn,
    categorical: &DataColumn,
    rows: &[usize],
) -> (Vec<f64>, Vec<String>) {
    let mut values = Vec::new();
    let mut categories = Vec::new();
    for &row in rows {
        let vc = &categorical.values()[row];
        if let (Some(v), false) = (numeric.values()[row].as_f64(), vc.is_null()) {
            values.push(v);
            categories.push(vc.label());
        }
    }
    (values, categories)
}

/// Pearson correlation; `None` when either side has zero variance or
/// fewer than two paired values. Exactly 1.0 for a column against itself.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den_x = 0.0;
    let mut den_y = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        num += dx * dy;
        den_x += dx * dx;
        den_y += dy * dy;
    }

    if den_x < 1e-12 || den_y < 1e-12 {
        return None;
    }

    Some((num / (den_x * den_y).sqrt()).clamp(-1.0, 1.0))
}

/// Spearman rank correlation: Pearson over average ranks
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Average ranks (1-based), ties receive the mean of their rank range
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < indexed.len() {
        let mut j = i;
        while j + 1 < indexed.len() && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[indexed[k].0] = avg_rank;
        }
        i = j + 1;
    }
    ranks
}

/// Cramér's V from the chi-squared statistic of the contingency table.
/// `None` when either variable has fewer than two categories.
pub fn cramers_v(x: &[String], y: &[String]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }
    let n = x.len() as f64;

    let mut joint: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    let mut margin_x: BTreeMap<&str, f64> = BTreeMap::new();
    let mut margin_y: BTreeMap<&str, f64> = BTreeMap::new();
    for (a, b) in x.iter().zip(y.iter()) {
        *joint.entry((a, b)).or_insert(0.0) += 1.0;
        *margin_x.entry(a).or_insert(0.0) += 1.0;
        *margin_y.entry(b).or_insert(0.0) += 1.0;
    }

    let r = margin_x.len();
    let c = margin_y.len();
    let min_dim = r.min(c).saturating_sub(1);
    if min_dim == 0 {
        return None;
    }

    let mut chi2 = 0.0;
    for (&kx, &nx) in &margin_x {
        for (&ky, &ny) in &margin_y {
            let expected = nx * ny / n;
            let observed = joint.get(&(kx, ky)).copied().unwrap_or(0.0);
            chi2 += (observed - expected).powi(2) / expected;
        }
    }

    Some((chi2 / (n * min_dim as f64)).sqrt().clamp(0.0, 1.0))
}

/// Correlation ratio (eta) of a numeric variable across categorical
/// groups: sqrt of between-group over total sum of squares. `None` when
/// the numeric variable has zero variance.
pub fn correlation_ratio(categories: &[String], values: &[f64]) -> Option<f64> {
    if categories.len() != values.len() || values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let grand_mean = values.iter().sum::<f64>() / n;

    let ss_total: f64 = values.iter().map(|v| (v - grand_mean).powi(2)).sum();
    if ss_total < 1e-12 {
        return None;
    }

    let mut groups: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for (cat, &v) in categories.iter().zip(values.iter()) {
        let entry = groups.entry(cat).or_insert((0.0, 0.0));
        entry.0 += v;
        entry.1 += 1.0;
    }

    let ss_between: f64 = groups
        .values()
        .map(|&(sum, count)| {
            let group_mean = sum / count;
            count * (group_mean - grand_mean).powi(2)
        })
        .sum();

    Some((ss_between / ss_total).sqrt().clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::StructuralAnalyzer;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pearson_self_is_exactly_one() {
        let x: Vec<f64> = (0..100).map(|i| (i as f64).sin() * 10.0 + i as f64).collect();
        assert_eq!(pearson(&x, &x), Some(1.0));
    }

    #[test]
    fn test_spearman_self_is_exactly_one() {
        let x: Vec<f64> = (0..100).map(|i| ((i * 37) % 100) as f64).collect();
        assert_eq!(spearman(&x, &x), Some(1.0));
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let x: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| -2.0 * v + 3.0).collect();
        let r = pearson(&x, &y).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance_undefined() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![5.0, 5.0, 5.0];
        assert!(pearson(&x, &y).is_none());
    }

    #[test]
    fn test_spearman_monotone_nonlinear() {
        let x: Vec<f64> = (1..50).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v.exp().min(1e300)).collect();
        let rho = spearman(&x, &y).unwrap();
        assert!((rho - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_ranks_with_ties() {
        let ranks = average_ranks(&[10.0, 20.0, 20.0, 30.0]);
        assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn test_cramers_v_range_and_dependence() {
        // Perfectly dependent pair
        let x = labels(&["a", "a", "b", "b", "a", "b", "a", "b"]);
        let v = cramers_v(&x, &x).unwrap();
        assert!((v - 1.0).abs() < 1e-9);

        // Independent-ish pair stays in [0, 1]
        let y = labels(&["p", "q", "p", "q", "q", "p", "q", "p"]);
        let v2 = cramers_v(&x, &y).unwrap();
        assert!((0.0..=1.0).contains(&v2));
    }

    #[test]
    fn test_cramers_v_single_category_undefined() {
        let x = labels(&["a", "a", "a"]);
        let y = labels(&["p", "q", "p"]);
        assert!(cramers_v(&x, &y).is_none());
    }

    #[test]
    fn test_correlation_ratio_separated_groups() {
        let categories = labels(&["a", "a", "a", "b", "b", "b"]);
        let values = vec![1.0, 1.1, 0.9, 10.0, 10.1, 9.9];
        let eta = correlation_ratio(&categories, &values).unwrap();
        assert!(eta > 0.99);
    }

    #[test]
    fn test_strength_labels() {
        assert_eq!(Strength::from_value(0.95), Strength::Strong);
        assert_eq!(Strength::from_value(-0.8), Strength::Strong);
        assert_eq!(Strength::from_value(0.5), Strength::Moderate);
        assert_eq!(Strength::from_value(0.1), Strength::Weak);
    }

    fn analyze(ds: &Dataset) -> CorrelationReport {
        let config = AnalysisConfig::default();
        let structure = StructuralAnalyzer::new(config.clone()).analyze(ds);
        CorrelationAnalyzer::new(config).analyze(ds, &structure)
    }

    #[test]
    fn test_method_dispatch_by_pair_type() {
        let ds = Dataset::new(vec![
            DataColumn::numeric("a", (0..40).map(|i| Some((i % 13) as f64)).collect()),
            DataColumn::numeric("b", (0..40).map(|i| Some(((i * 7) % 11) as f64)).collect()),
            DataColumn::text(
                "cat1",
                (0..40).map(|i| if i % 2 == 0 { "x" } else { "y" }).collect(),
            ),
            DataColumn::text(
                "cat2",
                (0..40).map(|i| if i % 3 == 0 { "p" } else { "q" }).collect(),
            ),
        ])
        .unwrap();

        let report = analyze(&ds);

        let ab: Vec<CorrelationMethod> =
            report.pair("a", "b").iter().map(|e| e.method).collect();
        assert!(ab.contains(&CorrelationMethod::Pearson));
        assert!(ab.contains(&CorrelationMethod::Spearman));

        let cats: Vec<CorrelationMethod> =
            report.pair("cat1", "cat2").iter().map(|e| e.method).collect();
        assert_eq!(cats, vec![CorrelationMethod::CramersV]);

        let mixed: Vec<CorrelationMethod> =
            report.pair("a", "cat1").iter().map(|e| e.method).collect();
        assert_eq!(mixed, vec![CorrelationMethod::CorrelationRatio]);
    }

    #[test]
    fn test_redundant_pair_detection() {
        let ds = Dataset::new(vec![
            DataColumn::numeric("x", (0..50).map(|i| Some((i % 23) as f64)).collect()),
            DataColumn::numeric("x2", (0..50).map(|i| Some((i % 23) as f64 * 3.0 + 1.0)).collect()),
            DataColumn::numeric("z", (0..50).map(|i| Some(((i * 7) % 13) as f64)).collect()),
        ])
        .unwrap();

        let report = analyze(&ds);
        assert_eq!(report.redundant_pairs.len(), 1);
        assert_eq!(report.redundant_pairs[0].column_a, "x");
        assert_eq!(report.redundant_pairs[0].column_b, "x2");
        assert!(report.multicollinearity.flagged.contains(&"x".to_string()));
    }

    #[test]
    fn test_no_numeric_columns_empty_matrix() {
        let ds = Dataset::new(vec![DataColumn::text(
            "only",
            (0..30).map(|i| if i % 2 == 0 { "a" } else { "b" }).collect(),
        )])
        .unwrap();

        let report = analyze(&ds);
        assert!(report.entries.is_empty());
        assert!(report.multicollinearity.vif.is_empty());
    }

    #[test]
    fn test_zero_variance_column_excluded_from_pearson() {
        let ds = Dataset::new(vec![
            DataColumn::numeric("flat", vec![Some(2.0); 30]),
            DataColumn::numeric("vary", (0..30).map(|i| Some((i % 7) as f64)).collect()),
        ])
        .unwrap();

        let report = analyze(&ds);
        assert!(report
            .pair("flat", "vary")
            .iter()
            .all(|e| e.method != CorrelationMethod::Pearson));
    }

    #[test]
    fn test_column_cap_truncates() {
        let cols: Vec<DataColumn> = (0..6)
            .map(|c| {
                DataColumn::numeric(
                    format!("c{c}"),
                    (0..20).map(|i| Some(((i * (c + 2)) % 11) as f64)).collect(),
                )
            })
            .collect();
        let ds = Dataset::new(cols).unwrap();

        let config = AnalysisConfig::default().with_max_correlation_columns(3);
        let structure = StructuralAnalyzer::new(config.clone()).analyze(&ds);
        let report = CorrelationAnalyzer::new(config).analyze(&ds, &structure);

        assert_eq!(report.truncated_to_columns, Some(3));
        // 3 columns => 3 pairs, Pearson + Spearman each
        assert!(report.entries.len() <= 6);
    }
}
