//! Format constants for KorEXO exports
//!
//! Line markers, the positional layout of the preamble rows and the
//! defaults used throughout the reader.

// =============================================================================
// Preamble Layout
// =============================================================================

/// Number of leading non-sensor columns (date, time, fractional time, site).
///
/// Metadata rows carry the same number of leading fields before their
/// per-parameter values, so this also aligns them with the table columns.
pub const PARAM_OFFSET: usize = 4;

/// Prefix of the line holding the stated file creation time
pub const FILE_CREATED_MARKER: &str = "FILE CREATED";

/// Marker contained in the per-parameter mean row
pub const MEAN_VALUE_MARKER: &str = "MEAN VALUE:";

/// Marker contained in the per-parameter standard deviation row
pub const STANDARD_DEVIATION_MARKER: &str = "STANDARD DEVIATION:";

/// Marker contained in the sensor serial number row
pub const SENSOR_SERIAL_MARKER: &str = "SENSOR SERIAL NUMBER:";

/// Prefix of the data header line
pub const HEADER_LINE_PREFIX: &str = "Date (";

/// Token used for a missing metadata value
pub const MISSING_TOKEN: &str = "NA";

// =============================================================================
// Dates
// =============================================================================

/// Display name of the leading date column
pub const DATE_COLUMN_NAME: &str = "Date";

/// Unit annotation for month-first dates
pub const UNIT_MONTH_FIRST: &str = "MM/DD/YYYY";

/// Unit annotation for day-first dates
pub const UNIT_DAY_FIRST: &str = "DD/MM/YYYY";

pub const MONTH_FIRST_FORMAT: &str = "%m/%d/%Y";
pub const DAY_FIRST_FORMAT: &str = "%d/%m/%Y";

/// Format of the combined date and time string in canonical tables
pub const COMBINED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Canonical Tables
// =============================================================================

/// Label given to raw columns the rename lookup does not know
pub const UNMAPPED_COLUMN: &str = "NA";

pub const DATETIME_COLUMN: &str = "datetime";
pub const CANONICAL_DATE_COLUMN: &str = "date";
pub const CANONICAL_TIME_COLUMN: &str = "time";

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_ENCODING: &str = "utf-16";
pub const DEFAULT_STEP: f64 = 0.05;
pub const DEFAULT_STEP_PRECISION: i32 = 5;

/// Largest grid a single resample may produce
pub const MAX_GRID_POINTS: usize = 10_000_000;
