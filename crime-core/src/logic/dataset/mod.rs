//! Dataset Module - Incident Records
//!
//! The historical incident export, as read from CSV or from the
//! document store, and the in-memory table the dashboard works on.

pub mod record;
pub mod frame;
pub mod csv;


pub use record::CrimeRecord;
pub use frame::{CrimeFrame, FilterOptions, DOCUMENT_ID_FIELD};
pub use self::csv::{drop_incomplete, read_records, read_records_from};

/// Columns every ingested record must carry
pub const INGEST_REQUIRED_FIELDS: &[&str] = &["HOUR", "MONTH", "DAY_OF_WEEK", "OFFENSE_CODE"];

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("malformed record: {0}")]
    Malformed(String),
}
