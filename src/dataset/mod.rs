//! In-memory dataset representation
//!
//! A [`Dataset`] is an ordered sequence of named columns of equal length.
//! It is immutable for the duration of an analysis run; no phase mutates
//! it or communicates through it.

mod loader;

pub use loader::DatasetLoader;

use crate::error::{EdaError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    Null,
}

impl Value {
    /// Whether this cell is missing
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell. Only `Float` and `Int` are numeric;
    /// booleans and text are not coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Canonical key used for distinct counting, duplicate detection and
    /// category frequencies. Deterministic for a given value.
    pub fn key(&self) -> String {
        match self {
            Value::Float(v) => format!("f:{v}"),
            Value::Int(v) => format!("i:{v}"),
            Value::Bool(v) => format!("b:{v}"),
            Value::Text(v) => format!("t:{v}"),
            Value::Null => "\u{2205}".to_string(),
        }
    }

    /// Display form used for category labels in reports
    pub fn label(&self) -> String {
        match self {
            Value::Float(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Text(v) => v.clone(),
            Value::Null => String::new(),
        }
    }

    /// Text view of the cell, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// A named column of values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataColumn {
    name: String,
    values: Vec<Value>,
}

impl DataColumn {
    /// Create a column from raw values
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Numeric column from optional floats (`None` becomes `Null`)
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(
            name,
            values
                .into_iter()
                .map(|v| v.map(Value::Float).unwrap_or(Value::Null))
                .collect(),
        )
    }

    /// Integer column from plain i64 values
    pub fn ints(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self::new(name, values.into_iter().map(Value::Int).collect())
    }

    /// Text column from string slices (empty string becomes `Null`)
    pub fn text(name: impl Into<String>, values: Vec<&str>) -> Self {
        Self::new(
            name,
            values
                .into_iter()
                .map(|v| {
                    if v.is_empty() {
                        Value::Null
                    } else {
                        Value::Text(v.to_string())
                    }
                })
                .collect(),
        )
    }

    /// Boolean column
    pub fn bools(name: impl Into<String>, values: Vec<bool>) -> Self {
        Self::new(name, values.into_iter().map(Value::Bool).collect())
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All values, including nulls
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no cells
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing cells
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Number of non-missing cells
    pub fn non_null_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Non-missing numeric values in row order
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(|v| v.as_f64()).collect()
    }

    /// Number of distinct non-missing values
    pub fn distinct_count(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        for v in &self.values {
            if !v.is_null() {
                seen.insert(v.key());
            }
        }
        seen.len()
    }

    /// Naive numeric test: majority of non-missing cells are Int/Float.
    /// Used as the fallback split when no column profile is available.
    pub fn looks_numeric(&self) -> bool {
        let non_null = self.non_null_count();
        if non_null == 0 {
            return false;
        }
        let numeric = self.values.iter().filter(|v| v.as_f64().is_some()).count();
        numeric * 2 > non_null
    }

    /// Naive categorical test: bounded distinct values and not numeric
    pub fn looks_categorical(&self) -> bool {
        let non_null = self.non_null_count();
        if non_null == 0 || self.looks_numeric() {
            return false;
        }
        let distinct = self.distinct_count();
        distinct <= 20 || (distinct as f64 / non_null as f64) <= 0.2
    }

    /// Frequency of each non-missing value label, in deterministic order
    pub fn value_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for v in &self.values {
            if !v.is_null() {
                *counts.entry(v.label()).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// An immutable tabular dataset: ordered named columns of equal length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<DataColumn>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset, validating that all columns have the same length
    /// and that column names are unique.
    pub fn new(columns: Vec<DataColumn>) -> Result<Self> {
        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);

        let mut seen = std::collections::HashSet::new();
        for col in &columns {
            if col.len() != n_rows {
                return Err(EdaError::ColumnLengthMismatch {
                    column: col.name().to_string(),
                    expected: n_rows,
                    actual: col.len(),
                });
            }
            if !seen.insert(col.name().to_string()) {
                return Err(EdaError::DuplicateColumnName(col.name().to_string()));
            }
        }

        Ok(Self { columns, n_rows })
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// All columns in dataset order
    pub fn columns(&self) -> &[DataColumn] {
        &self.columns
    }

    /// Column names in dataset order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&DataColumn> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Stable content fingerprint over shape, column names and cell
    /// values. Used as the key of a [`crate::report::ReportStore`].
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.n_rows.to_le_bytes());
        hasher.update((self.columns.len() as u64).to_le_bytes());
        for col in &self.columns {
            hasher.update(col.name().as_bytes());
            hasher.update([0x1f]);
            for v in col.values() {
                hasher.update(v.key().as_bytes());
                hasher.update([0x1e]);
            }
        }
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Deterministic stride sample: returns the row indices to visit when the
/// dataset exceeds `max_rows`, or `None` when no sampling is needed.
pub fn sample_indices(n_rows: usize, max_rows: usize) -> Option<Vec<usize>> {
    if n_rows <= max_rows || max_rows == 0 {
        return None;
    }
    let stride = n_rows.div_ceil(max_rows);
    Some((0..n_rows).step_by(stride).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_validates_lengths() {
        let cols = vec![
            DataColumn::ints("a", vec![1, 2, 3]),
            DataColumn::ints("b", vec![1, 2]),
        ];
        let err = Dataset::new(cols).unwrap_err();
        assert!(matches!(err, EdaError::ColumnLengthMismatch { .. }));
    }

    #[test]
    fn test_dataset_rejects_duplicate_names() {
        let cols = vec![
            DataColumn::ints("a", vec![1, 2]),
            DataColumn::ints("a", vec![3, 4]),
        ];
        let err = Dataset::new(cols).unwrap_err();
        assert!(matches!(err, EdaError::DuplicateColumnName(_)));
    }

    #[test]
    fn test_numeric_values_skip_nulls() {
        let col = DataColumn::numeric("x", vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(col.numeric_values(), vec![1.0, 3.0]);
        assert_eq!(col.null_count(), 1);
        assert_eq!(col.non_null_count(), 2);
    }

    #[test]
    fn test_distinct_count_mixed_types() {
        let col = DataColumn::new(
            "m",
            vec![
                Value::Int(1),
                Value::Float(1.0),
                Value::Text("1".to_string()),
                Value::Null,
            ],
        );
        // Int(1), Float(1.0) and Text("1") are distinct values
        assert_eq!(col.distinct_count(), 3);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let ds = Dataset::new(vec![DataColumn::ints("a", vec![1, 2, 3])]).unwrap();
        assert_eq!(ds.fingerprint(), ds.fingerprint());

        let other = Dataset::new(vec![DataColumn::ints("a", vec![1, 2, 4])]).unwrap();
        assert_ne!(ds.fingerprint(), other.fingerprint());
    }

    #[test]
    fn test_sample_indices() {
        assert!(sample_indices(100, 100).is_none());
        let idx = sample_indices(100, 10).unwrap();
        assert!(idx.len() <= 10);
        assert_eq!(idx[0], 0);
        // Stride sampling is deterministic
        assert_eq!(idx, sample_indices(100, 10).unwrap());
    }

    #[test]
    fn test_value_counts_order() {
        let col = DataColumn::text("c", vec!["b", "a", "b", ""]);
        let counts = col.value_counts();
        let keys: Vec<&String> = counts.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(counts["b"], 2);
    }
}
