//! Error types for the EDA engine

use thiserror::Error;

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, EdaError>;

/// Main error type for the EDA engine.
///
/// Only structurally invalid input aborts an analysis run: an empty
/// dataset, a dataset with no columns, or a target column that does not
/// exist. Degenerate computations (zero variance, too few values) are
/// recorded inside the affected report instead of being raised.
#[derive(Error, Debug)]
pub enum EdaError {
    #[error("Dataset has no rows")]
    EmptyDataset,

    #[error("Dataset has no columns")]
    NoColumns,

    #[error("Column '{column}' has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Target column not found: {0}")]
    TargetNotFound(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for EdaError {
    fn from(err: polars::error::PolarsError) -> Self {
        EdaError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for EdaError {
    fn from(err: serde_json::Error) -> Self {
        EdaError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EdaError::TargetNotFound("label".to_string());
        assert_eq!(err.to_string(), "Target column not found: label");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EdaError = io_err.into();
        assert!(matches!(err, EdaError::IoError(_)));
    }

    #[test]
    fn test_length_mismatch_display() {
        let err = EdaError::ColumnLengthMismatch {
            column: "age".to_string(),
            expected: 10,
            actual: 7,
        };
        assert_eq!(err.to_string(), "Column 'age' has 7 values, expected 10");
    }
}
