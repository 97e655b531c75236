//! Delimited-file source loader
//!
//! Reads a file with a header row fully into memory. Every record must have
//! exactly as many fields as the header.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use super::errors::{SourceError, SourceResult};
use super::row_set::RowSet;

/// Reader options for delimited sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Loads a comma-delimited file.
pub fn load(path: &Path) -> SourceResult<RowSet> {
    load_with(path, &SourceOptions::default())
}

/// Loads a delimited file with explicit options.
pub fn load_with(path: &Path, options: &SourceOptions) -> SourceResult<RowSet> {
    let source_id = path.display().to_string();
    let file = File::open(path).map_err(|e| SourceError::unavailable(&source_id, e.to_string()))?;

    let rows = load_reader(&source_id, file, options)?;
    info!(
        source = %source_id,
        rows = rows.len(),
        columns = rows.columns().len(),
        "source loaded"
    );
    Ok(rows)
}

/// Loads delimited text from any reader.
pub fn load_reader<R: Read>(source_id: &str, reader: R, options: &SourceOptions) -> SourceResult<RowSet> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| read_error(source_id, e))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(SourceError::malformed(source_id, "missing header row"));
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| read_error(source_id, e))?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    debug!(source = %source_id, records = records.len(), "records parsed");

    RowSet::from_records(source_id, headers.as_slice(), records)
}

fn read_error(source_id: &str, e: csv::Error) -> SourceError {
    match e.kind() {
        csv::ErrorKind::Io(io) => SourceError::unavailable(source_id, io.to_string()),
        _ => SourceError::malformed(source_id, e.to_string()),
    }
}
