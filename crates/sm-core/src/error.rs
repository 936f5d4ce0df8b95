//! Error types for sm-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sm-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open or decode a spreadsheet workbook
    #[error("failed to read workbook '{path}': {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// Workbook contains no sheets
    #[error("workbook '{path}' contains no sheets")]
    NoSheets { path: PathBuf },

    /// File has no header row to build columns from
    #[error("'{path}' contains no header row")]
    EmptyTable { path: PathBuf },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// File extension is not a supported tabular format
    #[error("unsupported file format: '{path}'")]
    UnsupportedFormat { path: PathBuf },

    /// Merge invoked with no input tables
    #[error("no input files to merge")]
    NoInput,

    /// Column sets differ in strict-schema mode
    #[error("column mismatch: expected [{expected}], found [{found}] in {path}")]
    SchemaMismatch {
        expected: String,
        found: String,
        path: PathBuf,
    },

    /// Unknown export encoding name
    #[error("unknown encoding '{0}', expected xlsx, csv or sqlite")]
    UnknownEncoding(String),

    /// Column name the database engine cannot accept
    #[error("invalid column name: '{0}'")]
    InvalidColumnName(String),

    /// Table name the database engine cannot accept
    #[error("invalid table name: '{0}'")]
    InvalidTableName(String),

    /// CSV writing error
    #[error("CSV write error: {0}")]
    CsvWrite(#[from] csv::Error),

    /// Workbook writing error
    #[error("workbook write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// SQLite error while building the database artifact
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
