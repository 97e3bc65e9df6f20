//! KorEXO Profile Library
//!
//! A Rust library for reading water-quality sonde exports written by the
//! YSI KorEXO software and turning depth casts into regularly spaced
//! profiles.
//!
//! This library provides tools for:
//! - Decoding exports in their native UTF-16 (or any WHATWG encoding)
//! - Scanning the preamble for sensor serials, means and standard deviations
//! - Loading the data body with polars and pairing columns with sensor metadata
//! - Detecting the date format from the `Date (...)` header label
//! - Renaming columns to canonical short names with a combined timestamp
//! - Resampling a profile onto a uniform step grid
//!
//! ```no_run
//! use korexo_profile::{ResampleOptions, map_columns, parse, resample};
//!
//! let record = parse("cast.csv")?;
//! let table = map_columns(&record.datasets)?;
//! let profile = resample(&table, "water_depth", &ResampleOptions::default())?;
//! println!("{}", profile);
//! # Ok::<(), korexo_profile::KorexoError>(())
//! ```

pub mod assembler;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod fallback;
pub mod header;
pub mod mapping;
pub mod models;
pub mod reader;
pub mod resample;
pub mod table;

pub use config::{DateFormat, ReadOptions, ResampleOptions};
pub use error::{KorexoError, Result};
pub use mapping::{CanonicalColumn, ColumnRenamer, CustomMapping, DefaultMapping};
pub use mapping::{map_columns, map_columns_with};
pub use models::{Dataset, FileMetadata, ParseWarning, Record, Value};
pub use reader::{parse, parse_bytes, parse_with_options};
pub use resample::resample;
