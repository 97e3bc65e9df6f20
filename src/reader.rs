//! Reading KorEXO exports into a [`Record`].
//!
//! The whole file is read into memory, decoded once, scanned for the
//! preamble and then loaded as a table from the header line onwards.

use crate::assembler::assemble_datasets;
use crate::config::ReadOptions;
use crate::error::Result;
use crate::header::scan_preamble;
use crate::models::{FileMetadata, Record};
use crate::table::{decode_text, load_table};
use chrono::{DateTime, Local};
use std::path::Path;
use tracing::{debug, warn};

/// Parse an export with the default options (UTF-16, automatic date format)
pub fn parse(path: impl AsRef<Path>) -> Result<Record> {
    parse_with_options(path, &ReadOptions::default())
}

/// Parse an export from disk
pub fn parse_with_options(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Record> {
    let path = path.as_ref();

    let fs_metadata = std::fs::metadata(path)?;
    let bytes = std::fs::read(path)?;

    let mut record = parse_source(&bytes, path, options)?;
    record.metadata.created_file = fs_metadata.created().ok().map(DateTime::<Local>::from);
    record.metadata.modified_file = fs_metadata.modified().ok().map(DateTime::<Local>::from);

    Ok(record)
}

/// Parse an export already held in memory; filesystem timestamps are left empty
pub fn parse_bytes(bytes: &[u8], options: &ReadOptions) -> Result<Record> {
    parse_source(bytes, Path::new("<memory>"), options)
}

fn parse_source(bytes: &[u8], path: &Path, options: &ReadOptions) -> Result<Record> {
    let text = decode_text(bytes, &options.encoding, path)?;
    let preamble = scan_preamble(&text, path)?;
    let table = load_table(&text, preamble.header_line_no, path)?;
    let (datasets, warnings) = assemble_datasets(&preamble, &table, options)?;

    for warning in &warnings {
        warn!("{}: {}", path.display(), warning);
    }

    let metadata = FileMetadata {
        created_file: None,
        modified_file: None,
        created_info: preamble.created_info.clone(),
        header_line_no: preamble.header_line_no,
        params: preamble.params().to_vec(),
        columns: preamble.columns,
        sensors: preamble.sensors,
        means: preamble.means,
        stdevs: preamble.stdevs,
    };

    debug!(
        "Parsed {}: {} datasets, {} rows",
        path.display(),
        datasets.len(),
        table.height()
    );

    Ok(Record {
        metadata,
        datasets,
        table,
        warnings,
    })
}
