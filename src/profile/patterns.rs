//! Pattern rules backing semantic type inference
//!
//! Small, fixed vocabularies and format lists so that inference order and
//! tie-breaks stay explicit and testable.

use crate::dataset::Value;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

static ID_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|[_\-])(id|key|uuid|guid|code|no|num)([_\-]|$)|(?i)id$")
        .expect("hardcoded regex")
});

static UUID_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("hardcoded regex")
});

/// Formats tried for date detection, in fixed order. The first format
/// that reaches the required match rate decides.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

/// Formats tried for datetime detection, in fixed order
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
];

const BOOLEAN_VOCAB: &[&str] = &[
    "true", "false", "yes", "no", "y", "n", "t", "f", "0", "1",
];

/// Whether a column name looks like an identifier
pub fn is_id_like_name(name: &str) -> bool {
    ID_NAME.is_match(name)
}

/// Whether a text value looks like a UUID
pub fn is_uuid(value: &str) -> bool {
    UUID_VALUE.is_match(value)
}

/// Whether a value belongs to the boolean vocabulary
pub fn is_boolean_like(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Int(v) => *v == 0 || *v == 1,
        Value::Float(v) => *v == 0.0 || *v == 1.0,
        Value::Text(s) => BOOLEAN_VOCAB.contains(&s.trim().to_lowercase().as_str()),
        Value::Null => false,
    }
}

/// Whether a value is numeric or parses as a number
pub fn is_numeric_like(value: &Value) -> bool {
    match value {
        Value::Float(_) | Value::Int(_) => true,
        Value::Text(s) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

/// Whether a text value parses under the given date or datetime format
pub fn matches_date_format(value: &str, format: &str) -> bool {
    let v = value.trim();
    NaiveDate::parse_from_str(v, format).is_ok() || NaiveDateTime::parse_from_str(v, format).is_ok()
}

/// Whether a slice of integers is strictly incrementing by one
pub fn is_sequential(values: &[i64]) -> bool {
    values.len() >= 2 && values.windows(2).all(|w| w[1] == w[0] + 1)
}

/// Best single date/datetime format over the given text values and its
/// match rate against `denom` (the column's non-missing count). Returns
/// `None` when nothing matches any format.
pub fn best_date_format(texts: &[&str], denom: usize) -> Option<(String, f64)> {
    if texts.is_empty() || denom == 0 {
        return None;
    }

    let mut best: Option<(String, f64)> = None;
    for format in DATE_FORMATS.iter().chain(DATETIME_FORMATS) {
        let matches = texts
            .iter()
            .filter(|s| matches_date_format(s, format))
            .count();
        let rate = matches as f64 / denom as f64;
        if best.as_ref().map(|(_, r)| rate > *r).unwrap_or(true) {
            best = Some((format.to_string(), rate));
        }
    }
    best.filter(|(_, r)| *r > 0.0)
}
