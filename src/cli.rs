//! Command-line interface components.

use crate::config::{DateFormat, ReadOptions, ResampleOptions};
use crate::constants::{DEFAULT_ENCODING, DEFAULT_STEP, DEFAULT_STEP_PRECISION};
use crate::models::Record;
use crate::{map_columns, parse_with_options, resample};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::{CsvWriter, SerWriter};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "korexo")]
#[command(about = "Read KorEXO sonde exports and resample depth profiles")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print file metadata and one summary line per column
    Summary {
        #[command(flatten)]
        read: ReadArgs,
    },
    /// Map columns to canonical names and resample onto a regular grid
    Resample {
        #[command(flatten)]
        read: ReadArgs,

        /// Canonical column used as the grid index
        #[arg(long, default_value = "water_depth")]
        index: String,

        /// Grid spacing in index units
        #[arg(long, default_value_t = DEFAULT_STEP)]
        step: f64,

        /// Decimal places used to align the grid to the step
        #[arg(long, default_value_t = DEFAULT_STEP_PRECISION)]
        precision: i32,

        /// Write CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
pub struct ReadArgs {
    /// KorEXO export file
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Text encoding of the export
    #[arg(long, default_value = DEFAULT_ENCODING)]
    pub encoding: String,

    /// Date format: "auto" or a strftime pattern such as %d/%m/%Y
    #[arg(long, default_value = "auto")]
    pub date_format: String,

    /// Keep the date column as text
    #[arg(long)]
    pub no_parse_dates: bool,
}

impl ReadArgs {
    pub fn read_options(&self) -> Result<ReadOptions> {
        let date_format: DateFormat = self
            .date_format
            .parse()
            .context("Invalid --date-format")?;
        Ok(ReadOptions::default()
            .with_encoding(self.encoding.clone())
            .with_date_format(date_format)
            .with_parse_dates(!self.no_parse_dates))
    }
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("korexo_profile={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Run the selected command
pub fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Summary { read } => {
            let record = read_record(&read)?;
            print_summary(&read.path, &record);
            Ok(())
        }
        Command::Resample {
            read,
            index,
            step,
            precision,
            output,
        } => {
            let record = read_record(&read)?;
            let table = map_columns(&record.datasets).context("Failed to map columns")?;
            let mut profile = resample(&table, &index, &ResampleOptions::new(step, precision))
                .with_context(|| format!("Failed to resample on '{}'", index))?;

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    CsvWriter::new(file).finish(&mut profile)?;
                    eprintln!(
                        "{} {} rows to {}",
                        "Wrote".bright_green(),
                        profile.height().to_string().bright_white().bold(),
                        path.display()
                    );
                }
                None => CsvWriter::new(io::stdout().lock()).finish(&mut profile)?,
            }
            Ok(())
        }
    }
}

fn read_record(read: &ReadArgs) -> Result<Record> {
    let options = read.read_options()?;
    parse_with_options(&read.path, &options)
        .with_context(|| format!("Failed to read {}", read.path.display()))
}

fn print_summary(path: &Path, record: &Record) {
    let md = &record.metadata;

    println!("{}", path.display().to_string().bright_green().bold());
    println!(
        "  {} {}",
        "Created (stated):".bright_cyan(),
        md.created_info.as_deref().unwrap_or("-")
    );
    if let Some(modified) = md.modified_file {
        println!("  {} {}", "Modified:".bright_cyan(), modified);
    }
    println!("  {} {}", "Header line:".bright_cyan(), md.header_line_no);
    println!(
        "  {} {}",
        "Rows:".bright_cyan(),
        record.table.height().to_string().bright_white()
    );
    println!();

    for dataset in &record.datasets {
        let stat = |v: Option<f64>| v.map_or_else(|| "NA".to_string(), |v| v.to_string());
        println!(
            "  {:<24} {:<12} mean={:<10} sd={:<10} median={}",
            dataset.column.bright_white(),
            dataset.sensor,
            stat(dataset.mean),
            stat(dataset.stdev),
            dataset.median
        );
    }

    for warning in &record.warnings {
        println!("  {} {}", "warning:".bright_yellow(), warning);
    }
}
