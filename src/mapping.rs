//! Canonical column names and the combined table.
//!
//! Raw KorEXO labels carry units and odd spacing (`ODO % sat`,
//! `Cond µS/cm`). The default lookup renames the known ones to short
//! snake_case names; anything else becomes [`UNMAPPED_COLUMN`].

use crate::constants::{
    CANONICAL_DATE_COLUMN, CANONICAL_TIME_COLUMN, COMBINED_TIMESTAMP_FORMAT, DATETIME_COLUMN,
    UNMAPPED_COLUMN,
};
use crate::error::{KorexoError, Result};
use crate::models::Dataset;
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Columns the default lookup knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalColumn {
    Date,
    Time,
    TimeSec,
    Site,
    Cond,
    WaterDepth,
    CondNlf,
    DoSat,
    DoLocal,
    DoConc,
    OrpMv,
    Press,
    SalPsu,
    SpCond,
    Tds,
    Ph,
    PhMv,
    Temp,
    VertPos,
    Battery,
    CablePower,
}

impl CanonicalColumn {
    pub const ALL: [CanonicalColumn; 21] = [
        CanonicalColumn::Date,
        CanonicalColumn::Time,
        CanonicalColumn::TimeSec,
        CanonicalColumn::Site,
        CanonicalColumn::Cond,
        CanonicalColumn::WaterDepth,
        CanonicalColumn::CondNlf,
        CanonicalColumn::DoSat,
        CanonicalColumn::DoLocal,
        CanonicalColumn::DoConc,
        CanonicalColumn::OrpMv,
        CanonicalColumn::Press,
        CanonicalColumn::SalPsu,
        CanonicalColumn::SpCond,
        CanonicalColumn::Tds,
        CanonicalColumn::Ph,
        CanonicalColumn::PhMv,
        CanonicalColumn::Temp,
        CanonicalColumn::VertPos,
        CanonicalColumn::Battery,
        CanonicalColumn::CablePower,
    ];

    /// Recognise a raw header label
    pub fn from_label(label: &str) -> Option<Self> {
        let column = match label {
            "Date (MM/DD/YYYY)" | "Date (DD/MM/YYYY)" => CanonicalColumn::Date,
            "Time (HH:mm:ss)" => CanonicalColumn::Time,
            "Time (Fract. Sec)" => CanonicalColumn::TimeSec,
            "Site Name" => CanonicalColumn::Site,
            "Cond µS/cm" => CanonicalColumn::Cond,
            "Depth m" => CanonicalColumn::WaterDepth,
            "nLF Cond µS/cm" => CanonicalColumn::CondNlf,
            "ODO % sat" => CanonicalColumn::DoSat,
            "ODO % local" => CanonicalColumn::DoLocal,
            "ODO mg/L" => CanonicalColumn::DoConc,
            "ORP mV" => CanonicalColumn::OrpMv,
            "Pressure psi a" => CanonicalColumn::Press,
            "Sal psu" => CanonicalColumn::SalPsu,
            "SpCond µS/cm" => CanonicalColumn::SpCond,
            "TDS mg/L" => CanonicalColumn::Tds,
            "pH" => CanonicalColumn::Ph,
            "pH mV" => CanonicalColumn::PhMv,
            "Temp °C" => CanonicalColumn::Temp,
            "Vertical Position m" => CanonicalColumn::VertPos,
            "Battery V" => CanonicalColumn::Battery,
            "Cable Pwr V" => CanonicalColumn::CablePower,
            _ => return None,
        };
        Some(column)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CanonicalColumn::Date => CANONICAL_DATE_COLUMN,
            CanonicalColumn::Time => CANONICAL_TIME_COLUMN,
            CanonicalColumn::TimeSec => "time_sec",
            CanonicalColumn::Site => "site",
            CanonicalColumn::Cond => "cond",
            CanonicalColumn::WaterDepth => "water_depth",
            CanonicalColumn::CondNlf => "cond_nlf",
            CanonicalColumn::DoSat => "do_sat",
            CanonicalColumn::DoLocal => "do_local",
            CanonicalColumn::DoConc => "do_conc",
            CanonicalColumn::OrpMv => "orp_mv",
            CanonicalColumn::Press => "press",
            CanonicalColumn::SalPsu => "sal_psu",
            CanonicalColumn::SpCond => "spcond",
            CanonicalColumn::Tds => "tds",
            CanonicalColumn::Ph => "ph",
            CanonicalColumn::PhMv => "ph_mv",
            CanonicalColumn::Temp => "temp",
            CanonicalColumn::VertPos => "vert_pos",
            CanonicalColumn::Battery => "battery",
            CanonicalColumn::CablePower => "cable_power",
        }
    }
}

/// A total rename lookup from raw labels to table column names
pub trait ColumnRenamer {
    fn rename(&self, label: &str) -> String;
}

/// The built-in KorEXO lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMapping;

impl ColumnRenamer for DefaultMapping {
    fn rename(&self, label: &str) -> String {
        CanonicalColumn::from_label(label)
            .map(|c| c.name())
            .unwrap_or(UNMAPPED_COLUMN)
            .to_string()
    }
}

/// A caller supplied lookup with a fallback label for unknown columns
#[derive(Debug, Clone)]
pub struct CustomMapping {
    names: HashMap<String, String>,
    fallback: String,
}

impl CustomMapping {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self {
            names,
            fallback: UNMAPPED_COLUMN.to_string(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }
}

impl ColumnRenamer for CustomMapping {
    fn rename(&self, label: &str) -> String {
        self.names
            .get(label)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Build the canonical table using the default lookup
pub fn map_columns(datasets: &[Dataset]) -> Result<DataFrame> {
    map_columns_with(datasets, &DefaultMapping)
}

/// Build a table of renamed columns with a leading `datetime` column.
///
/// When several labels rename to the same name the last dataset's values
/// are kept at the position of the first.
pub fn map_columns_with(datasets: &[Dataset], renamer: &impl ColumnRenamer) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(datasets.len() + 1);

    for dataset in datasets {
        let name = renamer.rename(&dataset.column);
        let column = dataset.data.clone().with_name(name.as_str().into()).into_column();

        match columns.iter().position(|c| c.name().as_str() == name) {
            Some(existing) => {
                debug!("Column '{}' renamed onto existing '{}'", dataset.column, name);
                columns[existing] = column;
            }
            None => columns.push(column),
        }
    }

    let mut df = DataFrame::new(columns)?;
    let timestamps = combined_timestamps(&df)?;
    df.insert_column(0, timestamps)?;

    debug!(
        "Mapped {} datasets into {} columns",
        datasets.len(),
        df.width()
    );
    Ok(df)
}

/// Parse `date` + " " + `time` into a datetime column
fn combined_timestamps(df: &DataFrame) -> Result<Column> {
    let dates = string_column(df, CANONICAL_DATE_COLUMN)?;
    let times = string_column(df, CANONICAL_TIME_COLUMN)?;

    let timestamps = dates
        .str()?
        .iter()
        .zip(times.str()?.iter())
        .map(|(date, time)| {
            let value = format!("{} {}", date.unwrap_or("NaT"), time.unwrap_or("NaT"));
            NaiveDateTime::parse_from_str(&value, COMBINED_TIMESTAMP_FORMAT)
                .map_err(|source| KorexoError::TimestampParse { value, source })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(
        DatetimeChunked::from_naive_datetime(
            DATETIME_COLUMN.into(),
            timestamps,
            TimeUnit::Milliseconds,
        )
        .into_series()
        .into_column(),
    )
}

fn string_column(df: &DataFrame, name: &str) -> Result<Series> {
    let column = df.column(name).map_err(|_| KorexoError::MissingColumn {
        name: name.to_string(),
    })?;
    Ok(column.as_materialized_series().cast(&DataType::String)?)
}
