use std::path::PathBuf;

use crate::store::StoreError;

/// Errors that can occur during metadata processing
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// I/O error reading metadata file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Malformed delimited text
    #[error("Invalid metadata format: {0}")]
    InvalidFormat(String),

    /// File type is not a recognised metadata source
    #[error("Invalid file type/extension: {0}")]
    UnsupportedExtension(PathBuf),

    /// Imported table is too small to be usable
    #[error("Unusable metadata: {0}")]
    Verify(String),

    /// Requested index column is not a total unique key
    #[error("Cannot index metadata: {0}")]
    Index(String),

    /// Metadata snapshot could not be loaded or saved
    #[error("Snapshot error: {0}")]
    Store(#[from] StoreError),
}
