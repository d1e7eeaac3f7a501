//! Header/row helpers for the columnar `history` and `analytics` blocks.
//!
//! A block's first row names the columns; each following row carries values by
//! position. Decoding is schema-driven: each header name is mapped to a column
//! of the target type once, and rows are then decoded independently so that a
//! malformed row fails alone.
use chrono::DateTime;
use serde_json::Value;
use thiserror::Error;

/// Why a single data row was skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    /// Row length differs from the header length.
    #[error("row has {found} columns, header has {expected}")]
    Width {
        /// Header length.
        expected: usize,
        /// Row length.
        found: usize,
    },

    /// A column holds a value of the wrong type.
    #[error("column `{0}` has an unexpected value")]
    Value(&'static str),

    /// A column the decoder needs is not in the header (or is null in the row).
    #[error("required column `{0}` is missing")]
    MissingColumn(&'static str),
}

/// Header names as strings; non-string header cells become `None` and are ignored.
pub fn header_names(header: &[Value]) -> Vec<Option<&str>> {
    header.iter().map(Value::as_str).collect()
}

/// Position of the first header cell matching any of `names`.
pub fn position(header: &[Option<&str>], names: &[&str]) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell.is_some_and(|c| names.contains(&c)))
}

/// Rejects rows whose width differs from the header.
pub fn check_width(header_len: usize, row: &[Value]) -> Result<(), RowError> {
    if row.len() == header_len {
        Ok(())
    } else {
        Err(RowError::Width {
            expected: header_len,
            found: row.len(),
        })
    }
}

/// Reads a finite number.
pub fn number(value: &Value, column: &'static str) -> Result<f64, RowError> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or(RowError::Value(column))
}

/// Reads epoch seconds from an integer, an integral float, a digit string or an
/// RFC 3339 timestamp.
pub fn epoch_seconds(value: &Value, column: &'static str) -> Result<i64, RowError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or(RowError::Value(column)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s.trim()).ok().map(|d| d.timestamp()))
            .ok_or(RowError::Value(column)),
        _ => Err(RowError::Value(column)),
    }
}
