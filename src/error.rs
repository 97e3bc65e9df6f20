//! Error handling for KorEXO profile reading.
//!
//! Provides error types with context for decoding, preamble scanning,
//! table loading, column mapping and resampling failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KorexoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Unknown text encoding label: {label}")]
    UnknownEncoding { label: String },

    #[error("Could not decode {path} as {encoding}: {reason}")]
    Decode {
        path: PathBuf,
        encoding: String,
        reason: String,
    },

    #[error("Malformed file: {path} - {reason}")]
    MalformedFile { path: PathBuf, reason: String },

    #[error("Metadata row '{row}' has {found} values but the header names {expected} sensor parameters")]
    MetadataMismatch {
        row: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid numeric token '{token}' in metadata row")]
    InvalidNumber { token: String },

    #[error("Column not found: {name}")]
    MissingColumn { name: String },

    #[error("Could not parse timestamp '{value}' (expected %Y-%m-%d %H:%M:%S): {source}")]
    TimestampParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid resample request: {reason}")]
    InvalidResample { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl KorexoError {
    /// Build a malformed-file error for a path
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a resample error
    pub fn invalid_resample(reason: impl Into<String>) -> Self {
        Self::InvalidResample {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KorexoError>;
