//! Dataset loading
//!
//! Thin adapter around polars readers. The analysis pipeline itself only
//! ever sees an in-memory [`Dataset`]; this module is the collaborator
//! that materializes one from CSV, TSV, Parquet or line-delimited JSON.

use crate::dataset::{DataColumn, Dataset, Value};
use crate::error::{EdaError, Result};
use polars::prelude::*;
use std::fs::File;

/// Loads tabular files into a [`Dataset`]
pub struct DatasetLoader {
    infer_schema_length: Option<usize>,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(100),
        }
    }

    /// Set the number of rows used for schema inference
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = Some(n);
        self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: &str) -> Result<Dataset> {
        self.load_csv_with_delimiter(path, b',')
    }

    /// Load a delimited text file with an explicit separator
    pub fn load_csv_with_delimiter(&self, path: &str, delimiter: u8) -> Result<Dataset> {
        let file = File::open(path).map_err(|e| EdaError::DataError(e.to_string()))?;

        let parse_opts = CsvParseOptions::default().with_separator(delimiter);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| EdaError::DataError(e.to_string()))?;

        Self::from_dataframe(&df)
    }

    /// Load a Parquet file
    pub fn load_parquet(&self, path: &str) -> Result<Dataset> {
        let file = File::open(path).map_err(|e| EdaError::DataError(e.to_string()))?;

        let df = ParquetReader::new(file)
            .finish()
            .map_err(|e| EdaError::DataError(e.to_string()))?;

        Self::from_dataframe(&df)
    }

    /// Load a line-delimited JSON file
    pub fn load_json(&self, path: &str) -> Result<Dataset> {
        let file = File::open(path).map_err(|e| EdaError::DataError(e.to_string()))?;

        let df = JsonReader::new(file)
            .finish()
            .map_err(|e| EdaError::DataError(e.to_string()))?;

        Self::from_dataframe(&df)
    }

    /// Detect file format from the extension and load
    pub fn load_auto(&self, path: &str) -> Result<Dataset> {
        let path_lower = path.to_lowercase();

        if path_lower.ends_with(".tsv") {
            self.load_csv_with_delimiter(path, b'\t')
        } else if path_lower.ends_with(".parquet") || path_lower.ends_with(".pq") {
            self.load_parquet(path)
        } else if path_lower.ends_with(".json") || path_lower.ends_with(".jsonl") {
            self.load_json(path)
        } else {
            self.load_csv(path)
        }
    }

    /// Convert a polars `DataFrame` into a [`Dataset`]
    pub fn from_dataframe(df: &DataFrame) -> Result<Dataset> {
        let mut columns = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let name = series.name().to_string();
            let values = Self::series_values(series)?;
            columns.push(DataColumn::new(name, values));
        }

        Dataset::new(columns)
    }

    fn series_values(series: &Series) -> Result<Vec<Value>> {
        let values = match series.dtype() {
            DataType::Float64 | DataType::Float32 => {
                let ca = series
                    .cast(&DataType::Float64)
                    .map_err(|e| EdaError::DataError(e.to_string()))?;
                let ca = ca.f64().map_err(|e| EdaError::DataError(e.to_string()))?;
                ca.into_iter()
                    .map(|v| v.map(Value::Float).unwrap_or(Value::Null))
                    .collect()
            }
            dt if dt.is_integer() => {
                let ca = series
                    .cast(&DataType::Int64)
                    .map_err(|e| EdaError::DataError(e.to_string()))?;
                let ca = ca.i64().map_err(|e| EdaError::DataError(e.to_string()))?;
                ca.into_iter()
                    .map(|v| v.map(Value::Int).unwrap_or(Value::Null))
                    .collect()
            }
            DataType::Boolean => {
                let ca = series
                    .bool()
                    .map_err(|e| EdaError::DataError(e.to_string()))?;
                ca.into_iter()
                    .map(|v| v.map(Value::Bool).unwrap_or(Value::Null))
                    .collect()
            }
            _ => {
                let ca = series
                    .cast(&DataType::String)
                    .map_err(|e| EdaError::DataError(e.to_string()))?;
                let ca = ca.str().map_err(|e| EdaError::DataError(e.to_string()))?;
                ca.into_iter()
                    .map(|v| match v {
                        Some(s) if !s.is_empty() => Value::Text(s.to_string()),
                        _ => Value::Null,
                    })
                    .collect()
            }
        };
        Ok(values)
    }
}
