//! Configuration for reading and resampling.
//!
//! Provides the option structures accepted by the reader and the
//! resampler, with defaults matching the KorEXO export conventions
//! and validation for caller supplied values.

use crate::constants::{DEFAULT_ENCODING, DEFAULT_STEP, DEFAULT_STEP_PRECISION};
use crate::error::{KorexoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How the leading date column is interpreted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DateFormat {
    /// Derive the format from the unit annotation in the `Date (...)` label
    #[default]
    Auto,
    /// A chrono `strftime` pattern such as `%d/%m/%Y`
    Explicit(String),
}

impl FromStr for DateFormat {
    type Err = KorexoError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KorexoError::Configuration {
                message: "date format must not be empty".to_string(),
            });
        }
        if s.eq_ignore_ascii_case("auto") {
            Ok(DateFormat::Auto)
        } else {
            Ok(DateFormat::Explicit(s.to_string()))
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::Auto => write!(f, "auto"),
            DateFormat::Explicit(pattern) => write!(f, "{}", pattern),
        }
    }
}

/// Options for reading a KorEXO export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadOptions {
    /// WHATWG encoding label (e.g. `utf-16`, `utf-8`, `windows-1252`)
    pub encoding: String,

    /// Convert the date column to calendar dates
    pub parse_dates: bool,

    /// Date format used when `parse_dates` is set
    pub date_format: DateFormat,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            parse_dates: true,
            date_format: DateFormat::Auto,
        }
    }
}

impl ReadOptions {
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    pub fn with_parse_dates(mut self, parse_dates: bool) -> Self {
        self.parse_dates = parse_dates;
        self
    }
}

/// Options for regular grid resampling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResampleOptions {
    /// Grid spacing in index units
    pub step: f64,

    /// Decimal places used when aligning the grid bounds to the step lattice
    pub precision: i32,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            precision: DEFAULT_STEP_PRECISION,
        }
    }
}

impl ResampleOptions {
    pub fn new(step: f64, precision: i32) -> Self {
        Self { step, precision }
    }

    /// Validate the step and precision
    pub fn validate(&self) -> Result<()> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(KorexoError::invalid_resample(format!(
                "step must be a positive finite number, got {}",
                self.step
            )));
        }

        // f64 carries roughly 15 significant decimal digits
        if !(0..=15).contains(&self.precision) {
            return Err(KorexoError::invalid_resample(format!(
                "precision must be between 0 and 15, got {}",
                self.precision
            )));
        }

        debug!(
            "Resample options validated: step={}, precision={}",
            self.step, self.precision
        );
        Ok(())
    }
}
