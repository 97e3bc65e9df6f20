//! KorEXO preamble scanning and metadata extraction.
//!
//! Walks the decoded export line by line to pick up the stated creation
//! time, the sensor serial, mean and standard deviation rows, and the
//! data header line that anchors the CSV body.

use crate::constants::{
    FILE_CREATED_MARKER, HEADER_LINE_PREFIX, MEAN_VALUE_MARKER, MISSING_TOKEN, PARAM_OFFSET,
    SENSOR_SERIAL_MARKER, STANDARD_DEVIATION_MARKER,
};
use crate::error::{KorexoError, Result};
use std::path::Path;
use tracing::debug;

/// Everything the preamble says about the data columns
#[derive(Debug, Clone, PartialEq)]
pub struct Preamble {
    pub created_info: Option<String>,
    /// 1-based line number of the `Date (` header
    pub header_line_no: usize,
    /// Full split of the header line, leading columns included
    pub columns: Vec<String>,
    pub sensors: Vec<String>,
    pub means: Vec<Option<f64>>,
    pub stdevs: Vec<Option<f64>>,
}

impl Preamble {
    /// Sensor parameter labels, aligned with `sensors`, `means` and `stdevs`
    pub fn params(&self) -> &[String] {
        &self.columns[PARAM_OFFSET..]
    }
}

/// Convert a metadata token to a number, `NA` being an explicit missing value
pub fn convert_numeric(token: &str) -> Result<Option<f64>> {
    if token == MISSING_TOKEN {
        return Ok(None);
    }

    token
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| KorexoError::InvalidNumber {
            token: token.to_string(),
        })
}

/// Scan decoded text for the preamble rows and the data header
pub fn scan_preamble(text: &str, path: &Path) -> Result<Preamble> {
    let mut scanner = PreambleScanner::default();

    for (line_num, line) in text.lines().enumerate() {
        if scanner.parse_line(line, line_num + 1)? {
            break;
        }
    }

    let preamble = scanner.build(path)?;

    debug!(
        "Scanned preamble for {}: header_line_no={}, parameters={}",
        path.display(),
        preamble.header_line_no,
        preamble.params().len()
    );

    Ok(preamble)
}

/// Accumulates preamble rows until the header line is reached
#[derive(Default)]
struct PreambleScanner {
    created_info: Option<String>,
    sensors: Option<Vec<String>>,
    means: Option<Vec<Option<f64>>>,
    stdevs: Option<Vec<Option<f64>>>,
    header: Option<(usize, Vec<String>)>,
}

impl PreambleScanner {
    /// Feed one line; returns true once the header line has been seen
    fn parse_line(&mut self, line: &str, line_no: usize) -> Result<bool> {
        if line.starts_with(HEADER_LINE_PREFIX) {
            let columns = line.split(',').map(str::to_string).collect();
            self.header = Some((line_no, columns));
            return Ok(true);
        }

        if line.starts_with(FILE_CREATED_MARKER) {
            if self.created_info.is_none() {
                self.created_info = line
                    .split_once(',')
                    .map(|(_, stated)| stated.trim().to_string());
            }
        } else if line.contains(MEAN_VALUE_MARKER) {
            if self.means.is_none() {
                self.means = Some(parse_numeric_row(line)?);
            }
        } else if line.contains(STANDARD_DEVIATION_MARKER) {
            if self.stdevs.is_none() {
                self.stdevs = Some(parse_numeric_row(line)?);
            }
        } else if line.contains(SENSOR_SERIAL_MARKER) && self.sensors.is_none() {
            self.sensors = Some(row_values(line).map(str::to_string).collect());
        }

        Ok(false)
    }

    fn build(self, path: &Path) -> Result<Preamble> {
        let (header_line_no, columns) = self
            .header
            .ok_or_else(|| KorexoError::malformed(path, "no data header found"))?;

        if columns.len() < PARAM_OFFSET {
            return Err(KorexoError::malformed(
                path,
                format!(
                    "data header has {} columns, expected at least {}",
                    columns.len(),
                    PARAM_OFFSET
                ),
            ));
        }

        let expected = columns.len() - PARAM_OFFSET;
        let sensors = aligned_row(self.sensors, "SENSOR SERIAL NUMBER", expected)?;
        let means = aligned_row(self.means, "MEAN VALUE", expected)?;
        let stdevs = aligned_row(self.stdevs, "STANDARD DEVIATION", expected)?;

        Ok(Preamble {
            created_info: self.created_info,
            header_line_no,
            columns,
            sensors,
            means,
            stdevs,
        })
    }
}

/// Fields of a metadata row after the leading columns
fn row_values(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').skip(PARAM_OFFSET)
}

fn parse_numeric_row(line: &str) -> Result<Vec<Option<f64>>> {
    row_values(line).map(convert_numeric).collect()
}

/// Check a metadata row exists and lines up with the sensor parameters
fn aligned_row<T>(row: Option<Vec<T>>, name: &'static str, expected: usize) -> Result<Vec<T>> {
    let values = row.unwrap_or_default();
    if values.len() != expected {
        return Err(KorexoError::MetadataMismatch {
            row: name,
            expected,
            found: values.len(),
        });
    }
    Ok(values)
}
