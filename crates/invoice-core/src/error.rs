use std::path::PathBuf;
use thiserror::Error;

use crate::models::Column;

/// All errors produced by the invoice report crates.
#[derive(Error, Debug)]
pub enum InvoiceError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file or its parent directory could not be created for writing.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader or writer rejected the input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An aggregation needs a column that the source header does not carry.
    #[error("Column {column} is required by {operation} but missing from the data")]
    MissingColumn {
        column: Column,
        operation: &'static str,
    },

    /// The given data file or directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No CSV files were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoDataFiles(PathBuf),

    /// An exported aggregate did not have the expected two-column shape.
    #[error("Malformed aggregate export: {0}")]
    MalformedExport(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the invoice crates.
pub type Result<T> = std::result::Result<T, InvoiceError>;
