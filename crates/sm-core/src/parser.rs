//! Parsers turning uploaded file bytes into Tables
//!
//! Dispatches on the file extension: Excel/OpenDocument workbooks go through
//! calamine, CSV goes through the csv crate. The first row of a sheet is the
//! header; data rows are padded or truncated to the header width.

use crate::error::{Error, Result};
use crate::table::{CellValue, Column, Row, Table};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// File extensions handled by the workbook parser
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

enum InputFormat {
    Workbook,
    Csv,
}

fn detect_format(path: &Path) -> Result<InputFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        Ok(InputFormat::Workbook)
    } else if ext == "csv" {
        Ok(InputFormat::Csv)
    } else {
        Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }
}

/// Parse one uploaded file into a Table
///
/// `name` is the original filename; it selects the parser and identifies the
/// file in any error raised here.
pub fn parse_bytes<P: AsRef<Path>>(bytes: &[u8], name: P) -> Result<Table> {
    let path = name.as_ref().to_path_buf();
    match detect_format(&path)? {
        InputFormat::Workbook => parse_workbook(bytes, path),
        InputFormat::Csv => parse_csv(bytes, path),
    }
}

/// Read a file from disk and parse it into a Table
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_bytes(&bytes, path)
}

fn parse_workbook(bytes: &[u8], path: PathBuf) -> Result<Table> {
    let cursor = Cursor::new(bytes);
    let mut workbook = open_workbook_auto_from_rs(cursor).map_err(|e| Error::Workbook {
        path: path.clone(),
        source: e,
    })?;

    // The original tool reads a single-sheet upload; only the first sheet counts.
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::NoSheets { path: path.clone() })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| Error::Workbook {
            path: path.clone(),
            source: e,
        })?;

    let mut rows_iter = range.rows();

    let header_row = rows_iter
        .next()
        .ok_or_else(|| Error::EmptyTable { path: path.clone() })?;

    if header_row.iter().all(|c| matches!(c, Data::Empty)) {
        return Err(Error::EmptyTable { path });
    }

    let columns: Vec<Column> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| Column::new(header_name(cell, i), i))
        .collect();

    let mut rows = Vec::new();
    for data_row in rows_iter {
        let cells: Vec<CellValue> = data_row.iter().map(convert_cell).collect();
        rows.push(Row::new(fit_to_width(cells, columns.len())));
    }

    Ok(Table {
        columns,
        rows,
        sources: vec![path],
    })
}

fn parse_csv(bytes: &[u8], path: PathBuf) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(bytes);

    let headers = csv_reader
        .headers()
        .map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?
        .clone();

    if headers.is_empty() {
        return Err(Error::EmptyTable { path });
    }

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let trimmed = name.trim();
            let name = if trimmed.is_empty() {
                fallback_name(i)
            } else {
                trimmed.to_string()
            };
            Column::new(name, i)
        })
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        let cells: Vec<CellValue> = record.iter().map(CellValue::parse).collect();
        rows.push(Row::new(fit_to_width(cells, columns.len())));
    }

    Ok(Table {
        columns,
        rows,
        sources: vec![path],
    })
}

/// Pad a short row with empty cells, truncate a long one
fn fit_to_width(mut cells: Vec<CellValue>, width: usize) -> Vec<CellValue> {
    while cells.len() < width {
        cells.push(CellValue::Empty);
    }
    cells.truncate(width);
    cells
}

fn header_name(cell: &Data, index: usize) -> String {
    let name = cell.to_string();
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback_name(index)
    } else {
        trimmed.to_string()
    }
}

/// Positional name for a blank header cell
fn fallback_name(index: usize) -> String {
    format!("column_{index}")
}

fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(trimmed.to_string())
            }
        }
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            None => CellValue::Empty,
        },
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let csv = "ID,Name,Value\n1,foo,100\n2,bar,200\n";
        let table = parse_bytes(csv.as_bytes(), "test.csv").unwrap();

        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.columns[0].name, "ID");
        assert_eq!(table.columns[1].name, "Name");
        assert_eq!(table.columns[2].name, "Value");

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells[0], CellValue::Int(1));
        assert_eq!(table.rows[1].cells[1], CellValue::Text("bar".to_string()));
    }

    #[test]
    fn test_parse_with_empty_cells() {
        let csv = "ID,Name,Value\n1,,100\n2,bar,\n";
        let table = parse_bytes(csv.as_bytes(), "test.csv").unwrap();

        assert_eq!(table.rows[0].cells[1], CellValue::Empty);
        assert_eq!(table.rows[1].cells[2], CellValue::Empty);
    }

    #[test]
    fn test_parse_short_rows_are_padded() {
        let csv = "A,B,C\n1,2\n";
        let table = parse_bytes(csv.as_bytes(), "test.csv").unwrap();

        assert_eq!(table.rows[0].cells.len(), 3);
        assert_eq!(table.rows[0].cells[2], CellValue::Empty);
    }

    #[test]
    fn test_parse_with_floats() {
        let csv = "ID,Value\n1,3.14\n2,-2.5\n";
        let table = parse_bytes(csv.as_bytes(), "test.csv").unwrap();

        assert_eq!(table.rows[0].cells[1], CellValue::Float(3.14));
        assert_eq!(table.rows[1].cells[1], CellValue::Float(-2.5));
    }

    #[test]
    fn test_parse_blank_header_gets_positional_name() {
        let csv = "A,,C\n1,2,3\n";
        let table = parse_bytes(csv.as_bytes(), "test.csv").unwrap();

        assert_eq!(table.columns[1].name, "column_1");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = parse_bytes(b"whatever", "notes.txt").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_corrupt_workbook_names_the_file() {
        let err = parse_bytes(b"this is not a workbook", "broken.xlsx").unwrap_err();
        match err {
            Error::Workbook { path, .. } => {
                assert_eq!(path, PathBuf::from("broken.xlsx"));
            }
            other => panic!("expected workbook error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_sets_source() {
        let csv = "A\n1\n";
        let table = parse_bytes(csv.as_bytes(), "one.csv").unwrap();
        assert_eq!(table.sources, vec![PathBuf::from("one.csv")]);
    }
}
