//! CSV ingestion of the historical incident export.
//!
//! The export is Latin-1 encoded. Each byte is decoded to the code point of
//! the same value before parsing, so no byte sequence is rejected.

use std::fs;
use std::io::Read;
use std::path::Path;

use super::record::CrimeRecord;
use super::DatasetError;

/// Latin-1 → UTF-8
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<CrimeRecord>, DatasetError> {
    let path = path.as_ref();
    log::info!("Reading incident export: {}", path.display());

    let file = fs::File::open(path)?;
    let records = read_records_from(file)?;

    log::info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

pub fn read_records_from<R: Read>(mut reader: R) -> Result<Vec<CrimeRecord>, DatasetError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = decode_latin1(&bytes);

    let mut csv_reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<CrimeRecord>() {
        records.push(row?);
    }
    Ok(records)
}

/// Keep records that have every one of `required` columns
pub fn drop_incomplete(records: Vec<CrimeRecord>, required: &[&str]) -> Vec<CrimeRecord> {
    let before = records.len();
    let kept: Vec<CrimeRecord> = records
        .into_iter()
        .filter(|r| required.iter().all(|field| r.has_field(field)))
        .collect();

    if kept.len() < before {
        log::debug!("Dropped {} incomplete records (required: {:?})", before - kept.len(), required);
    }
    kept
}
