//! Core data structures for KorEXO profile reading.
//!
//! Defines the file metadata gathered from the preamble, the per-column
//! datasets, the parse record and the scalar values used for summaries.

use chrono::{DateTime, Local, NaiveDate};
use polars::prelude::{AnyValue, DataFrame, Series};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days between 0001-01-01 and the Unix epoch, as counted by chrono
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A single scalar taken from a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<AnyValue<'_>> for Value {
    fn from(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Value::Missing,
            AnyValue::Boolean(v) => Value::Bool(v),
            AnyValue::Int8(v) => Value::Int(v.into()),
            AnyValue::Int16(v) => Value::Int(v.into()),
            AnyValue::Int32(v) => Value::Int(v.into()),
            AnyValue::Int64(v) => Value::Int(v),
            AnyValue::UInt8(v) => Value::Int(v.into()),
            AnyValue::UInt16(v) => Value::Int(v.into()),
            AnyValue::UInt32(v) => Value::Int(v.into()),
            AnyValue::UInt64(v) => match i64::try_from(v) {
                Ok(v) => Value::Int(v),
                Err(_) => Value::Float(v as f64),
            },
            AnyValue::Float32(v) => Value::Float(v.into()),
            AnyValue::Float64(v) => Value::Float(v),
            AnyValue::String(s) => Value::Text(s.to_string()),
            AnyValue::StringOwned(s) => Value::Text(s.to_string()),
            AnyValue::Date(days) => {
                match NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE) {
                    Some(date) => Value::Date(date),
                    None => Value::Missing,
                }
            }
            other => Value::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "NA"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
        }
    }
}

/// Metadata gathered from the filesystem and the file preamble
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Filesystem creation time, where the platform reports one
    pub created_file: Option<DateTime<Local>>,
    pub modified_file: Option<DateTime<Local>>,
    /// Creation time as stated in the `FILE CREATED` line
    pub created_info: Option<String>,
    /// 1-based line number of the data header
    pub header_line_no: usize,
    /// Every header label, including the four leading columns
    pub columns: Vec<String>,
    /// Sensor parameter labels (header labels after the leading columns)
    pub params: Vec<String>,
    pub sensors: Vec<String>,
    pub means: Vec<Option<f64>>,
    pub stdevs: Vec<Option<f64>>,
}

/// One column of the export with its sensor metadata and summary
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Display name (label without unit annotation for leading columns)
    pub name: String,
    /// Raw header label
    pub column: String,
    /// Sensor serial, empty for the leading columns
    pub sensor: String,
    pub mean: Option<f64>,
    pub stdev: Option<f64>,
    pub data: Series,
    /// The repeated value for constant columns, else the median, else the first value.
    ///
    /// The median skips nulls and NaN rather than propagating them.
    pub median: Value,
}

/// Non-fatal conditions met while assembling datasets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseWarning {
    /// The `Date (...)` unit annotation did not name a known format
    DateFormatUnresolved { column: String, unit: String },
    /// Date conversion failed as a whole; raw values were kept
    DateParseFailed { column: String, reason: String },
    /// No median could be computed; the first value was used
    MedianUnavailable { column: String, reason: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::DateFormatUnresolved { column, unit } => write!(
                f,
                "{}: unrecognised date unit '{}', dates left unparsed",
                column, unit
            ),
            ParseWarning::DateParseFailed { column, reason } => {
                write!(f, "{}: date parsing failed ({}), raw values kept", column, reason)
            }
            ParseWarning::MedianUnavailable { column, reason } => {
                write!(f, "{}: no median ({}), first value used", column, reason)
            }
        }
    }
}

/// Result of parsing one export
#[derive(Debug, Clone)]
pub struct Record {
    pub metadata: FileMetadata,
    pub datasets: Vec<Dataset>,
    /// The data body keyed by the raw header labels
    pub table: DataFrame,
    pub warnings: Vec<ParseWarning>,
}

impl Record {
    /// Look up a dataset by its raw header label
    pub fn dataset(&self, column: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.column == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from_any_value() {
        assert_eq!(Value::from(AnyValue::Null), Value::Missing);
        assert_eq!(Value::from(AnyValue::Int32(7)), Value::Int(7));
        assert_eq!(Value::from(AnyValue::Float64(1.5)), Value::Float(1.5));
        assert_eq!(
            Value::from(AnyValue::String("Site A")),
            Value::Text("Site A".to_string())
        );
        assert_eq!(
            Value::from(AnyValue::Date(0)),
            Value::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_value_numeric_view() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Text("x".to_string()).as_f64(), None);
        assert!(Value::Missing.is_missing());
    }
}
