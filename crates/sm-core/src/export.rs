//! Serialization of a combined table into a download artifact
//!
//! Three encodings: a single-sheet xlsx workbook, CSV text, and a standalone
//! SQLite database file. All of them are pure functions of the table; the
//! SQLite encoding stages through a temporary file because the format cannot
//! be produced in memory, and the staging file is removed on every exit path.

use crate::error::{Error, Result};
use crate::table::{CellValue, Table};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;

/// Default table name for the SQLite artifact and xlsx sheet
pub const DEFAULT_TABLE_NAME: &str = "MergedData";

/// Supported export encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Single-sheet Excel workbook
    Xlsx,
    /// Comma-separated text
    Csv,
    /// Standalone SQLite database file
    Sqlite,
}

impl Encoding {
    /// Conventional file extension for this encoding
    pub fn extension(&self) -> &'static str {
        match self {
            Encoding::Xlsx => "xlsx",
            Encoding::Csv => "csv",
            Encoding::Sqlite => "db",
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Encoding::Xlsx),
            "csv" => Ok(Encoding::Csv),
            "sqlite" | "db" => Ok(Encoding::Sqlite),
            other => Err(Error::UnknownEncoding(other.to_string())),
        }
    }
}

/// Options for an export invocation
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Name of the table in the SQLite artifact (also the xlsx sheet name)
    pub table_name: Option<String>,
}

impl ExportOptions {
    fn table_name(&self) -> &str {
        self.table_name.as_deref().unwrap_or(DEFAULT_TABLE_NAME)
    }
}

/// Serialize a table into the requested encoding
pub fn export(table: &Table, encoding: Encoding, options: &ExportOptions) -> Result<Vec<u8>> {
    match encoding {
        Encoding::Xlsx => write_xlsx(table, options.table_name()),
        Encoding::Csv => write_csv(table),
        Encoding::Sqlite => write_sqlite(table, options.table_name()),
    }
}

fn write_xlsx(table: &Table, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (c, col) in table.columns.iter().enumerate() {
        worksheet.write_string(0, c as u16, col.name.as_str())?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.cells.iter().enumerate() {
            let c = c as u16;
            match cell {
                CellValue::Text(s) => {
                    worksheet.write_string(r, c, s.as_str())?;
                }
                CellValue::Int(i) => {
                    worksheet.write_number(r, c, *i as f64)?;
                }
                CellValue::Float(f) => {
                    worksheet.write_number(r, c, *f)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                CellValue::DateTime(dt) => {
                    worksheet.write_datetime_with_format(r, c, dt, &datetime_format)?;
                }
                CellValue::Empty => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_csv(table: &Table) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(table.header())?;

        for row in &table.rows {
            writer.write_record(row.cells.iter().map(CellValue::to_display_string))?;
        }

        writer.flush().map_err(Error::Io)?;
    }
    Ok(buf)
}

fn write_sqlite(table: &Table, table_name: &str) -> Result<Vec<u8>> {
    write_sqlite_in(table, table_name, std::env::temp_dir())
}

/// Build the SQLite artifact, staging in `dir`
///
/// The staging file is owned by a `NamedTempFile` guard, so it is unlinked
/// when this function returns, whether with the artifact bytes or an error.
fn write_sqlite_in<P: AsRef<Path>>(table: &Table, table_name: &str, dir: P) -> Result<Vec<u8>> {
    if !is_valid_identifier(table_name) {
        return Err(Error::InvalidTableName(table_name.to_string()));
    }
    for col in &table.columns {
        if !is_valid_identifier(&col.name) {
            return Err(Error::InvalidColumnName(col.name.clone()));
        }
    }

    let staging = NamedTempFile::new_in(dir)?;

    let mut conn = Connection::open(staging.path())?;

    let column_defs: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{} {}", quote_ident(&col.name), infer_column_type(table, i)))
        .collect();
    conn.execute(
        &format!(
            "CREATE TABLE {} ({})",
            quote_ident(table_name),
            column_defs.join(", ")
        ),
        [],
    )?;

    let tx = conn.transaction()?;
    {
        let column_list: Vec<String> =
            table.columns.iter().map(|c| quote_ident(&c.name)).collect();
        let placeholders: Vec<String> = (1..=table.columns.len())
            .map(|i| format!("?{i}"))
            .collect();
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table_name),
            column_list.join(", "),
            placeholders.join(", ")
        ))?;

        for row in &table.rows {
            let values: Vec<SqlValue> = row.cells.iter().map(bind_value).collect();
            stmt.execute(params_from_iter(values))?;
        }
    }
    tx.commit()?;
    drop(conn);

    let bytes = fs::read(staging.path())?;
    Ok(bytes)
}

/// SQLite column type for one column: REAL when every non-empty cell in it is
/// numeric, TEXT otherwise
fn infer_column_type(table: &Table, index: usize) -> &'static str {
    let mut saw_number = false;
    for row in &table.rows {
        match row.cells.get(index) {
            Some(cell) if cell.is_numeric() => saw_number = true,
            Some(CellValue::Empty) | None => {}
            Some(_) => return "TEXT",
        }
    }
    if saw_number {
        "REAL"
    } else {
        "TEXT"
    }
}

fn bind_value(cell: &CellValue) -> SqlValue {
    match cell {
        CellValue::Empty => SqlValue::Null,
        CellValue::Int(i) => SqlValue::Integer(*i),
        CellValue::Float(f) => SqlValue::Real(*f),
        other => SqlValue::Text(other.to_display_string()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && !name.contains('\0')
}
