//! Dataset assembly from the preamble and the loaded table.
//!
//! Each table column becomes a [`Dataset`]. Sensor columns are joined with
//! the preamble rows by position; the four leading columns get a display
//! name, optional date conversion and no sensor metadata. Every dataset
//! carries a summary value.

use crate::config::{DateFormat, ReadOptions};
use crate::constants::{
    DATE_COLUMN_NAME, DAY_FIRST_FORMAT, MONTH_FIRST_FORMAT, PARAM_OFFSET, UNIT_DAY_FIRST,
    UNIT_MONTH_FIRST,
};
use crate::error::{KorexoError, Result};
use crate::fallback::attempt_or;
use crate::header::Preamble;
use crate::models::{Dataset, ParseWarning, Value};
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::debug;

/// Build one dataset per header column, in header order
pub fn assemble_datasets(
    preamble: &Preamble,
    table: &DataFrame,
    options: &ReadOptions,
) -> Result<(Vec<Dataset>, Vec<ParseWarning>)> {
    let mut datasets = Vec::with_capacity(preamble.columns.len());
    let mut warnings = Vec::new();
    let params = preamble.params();

    for (i, label) in preamble.columns.iter().enumerate() {
        let mut data = table
            .column(label)
            .map_err(|_| KorexoError::MissingColumn {
                name: label.clone(),
            })?
            .as_materialized_series()
            .clone();

        let dataset = if i >= PARAM_OFFSET {
            let pi = i - PARAM_OFFSET;
            let median = summarize(&data, label, &mut warnings)?;
            Dataset {
                name: params[pi].clone(),
                column: label.clone(),
                sensor: preamble.sensors[pi].clone(),
                mean: preamble.means[pi],
                stdev: preamble.stdevs[pi],
                data,
                median,
            }
        } else {
            let (name, unit) = split_label(label);
            if options.parse_dates && name == DATE_COLUMN_NAME {
                data = convert_dates(data, label, unit, &options.date_format, &mut warnings);
            }
            let median = summarize(&data, label, &mut warnings)?;
            Dataset {
                name,
                column: label.clone(),
                sensor: String::new(),
                mean: None,
                stdev: None,
                data,
                median,
            }
        };

        datasets.push(dataset);
    }

    debug!(
        "Assembled {} datasets ({} warnings)",
        datasets.len(),
        warnings.len()
    );
    Ok((datasets, warnings))
}

/// Split a label such as `Date (MM/DD/YYYY)` into its name and unit text
fn split_label(label: &str) -> (String, Option<&str>) {
    match label.split_once('(') {
        Some((name, rest)) => {
            let unit = rest.strip_suffix(')').unwrap_or(rest).trim();
            (name.trim().to_string(), Some(unit))
        }
        None => (label.to_string(), None),
    }
}

/// Pick the strftime pattern for the date column, if one can be determined
fn resolve_date_format(unit: Option<&str>, requested: &DateFormat) -> Option<String> {
    match requested {
        DateFormat::Explicit(pattern) => Some(pattern.clone()),
        DateFormat::Auto => match unit {
            Some(UNIT_MONTH_FIRST) => Some(MONTH_FIRST_FORMAT.to_string()),
            Some(UNIT_DAY_FIRST) => Some(DAY_FIRST_FORMAT.to_string()),
            _ => None,
        },
    }
}

/// Best-effort date conversion; the raw series is returned when it fails
fn convert_dates(
    data: Series,
    label: &str,
    unit: Option<&str>,
    requested: &DateFormat,
    warnings: &mut Vec<ParseWarning>,
) -> Series {
    let Some(format) = resolve_date_format(unit, requested) else {
        let unit = unit.unwrap_or_default().to_string();
        debug!("{}: unrecognised date unit '{}', leaving dates unparsed", label, unit);
        warnings.push(ParseWarning::DateFormatUnresolved {
            column: label.to_string(),
            unit,
        });
        return data;
    };

    let outcome = attempt_or(|| parse_dates(&data, &format), || data.clone());
    if let Some(reason) = outcome.failure() {
        debug!("{}: date parsing failed, keeping raw values: {}", label, reason);
        warnings.push(ParseWarning::DateParseFailed {
            column: label.to_string(),
            reason,
        });
    }
    outcome.into_value()
}

/// Parse every value with `format`; unparsable entries become null dates
fn parse_dates(data: &Series, format: &str) -> PolarsResult<Series> {
    let values = data.str()?;
    let dates = values
        .iter()
        .map(|v| v.and_then(|s| NaiveDate::parse_from_str(s.trim(), format).ok()));
    Ok(DateChunked::from_naive_date_options(data.name().clone(), dates).into_series())
}

/// The repeated value of a constant series, else its median, else its first value
fn summarize(data: &Series, label: &str, warnings: &mut Vec<ParseWarning>) -> Result<Value> {
    if data.is_empty() {
        return Ok(Value::Missing);
    }

    if data.n_unique()? == 1 {
        return Ok(Value::from(data.get(0)?));
    }

    let outcome = attempt_or(|| median(data), || first_value(data));
    if let Some(reason) = outcome.failure() {
        debug!("{}: no median ({}), using first value", label, reason);
        warnings.push(ParseWarning::MedianUnavailable {
            column: label.to_string(),
            reason,
        });
    }
    Ok(outcome.into_value())
}

fn first_value(data: &Series) -> Value {
    data.get(0).map(Value::from).unwrap_or(Value::Missing)
}

/// Median of the non-null values of a numeric series
fn median(data: &Series) -> std::result::Result<Value, String> {
    if !data.dtype().is_primitive_numeric() {
        return Err(format!("column of type {} is not numeric", data.dtype()));
    }

    let floats = data.cast(&DataType::Float64).map_err(|e| e.to_string())?;
    let mut values: Vec<f64> = floats
        .f64()
        .map_err(|e| e.to_string())?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();

    if values.is_empty() {
        return Err("no numeric values".to_string());
    }

    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };
    Ok(Value::Float(median))
}
