//! sm-core: Core library for merging spreadsheet files into one table
//!
//! This library provides functionality to:
//! - Parse uploaded spreadsheet files (xlsx, xlsm, xlsb, xls, ods) and CSV
//!   into structured tables
//! - Concatenate tables into one combined table with a union column set
//! - Export the combined table as an xlsx workbook, CSV text, or a
//!   standalone SQLite database file
//! - Scan directories for tabular input files

pub mod discover;
pub mod error;
pub mod export;
pub mod merger;
pub mod parser;
pub mod table;

pub use discover::find_tabular_files;
pub use error::{Error, Result};
pub use export::{export, Encoding, ExportOptions, DEFAULT_TABLE_NAME};
pub use merger::{concat_tables, concat_tables_strict, merge_bytes, merge_paths};
pub use parser::{parse_bytes, parse_file};
pub use table::{CellValue, Column, Row, Table};
