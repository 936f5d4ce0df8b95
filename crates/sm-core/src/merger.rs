//! Concatenation of parsed tables into one combined table

use crate::error::{Error, Result};
use crate::parser::parse_bytes;
use crate::table::{CellValue, Column, Row, Table};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Parse uploaded `(filename, bytes)` pairs and concatenate them in order
///
/// The first file that fails to parse aborts the whole merge; no partial
/// table is returned.
pub fn merge_bytes(files: &[(String, Vec<u8>)]) -> Result<Table> {
    let mut tables: Vec<Table> = Vec::new();
    for (name, bytes) in files {
        let table = parse_bytes(bytes, name)?;
        tables.push(table);
    }

    concat_tables(tables)
}

/// Parse files from disk and concatenate them in order
pub fn merge_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Table> {
    let mut tables: Vec<Table> = Vec::new();
    for path in paths {
        let table = crate::parser::parse_file(path)?;
        tables.push(table);
    }

    concat_tables(tables)
}

/// Concatenate tables into one combined table
///
/// The combined column set is the union of all input columns in first-seen
/// order. Each row is reindexed against that union, with missing cells filled
/// as empty, and rows are appended in input order.
pub fn concat_tables(tables: Vec<Table>) -> Result<Table> {
    if tables.is_empty() {
        return Err(Error::NoInput);
    }

    // Build unified column list (union of all columns, first-seen order)
    let mut column_names: Vec<String> = Vec::new();
    let mut seen_columns: HashSet<String> = HashSet::new();

    for table in &tables {
        for col in &table.columns {
            if !seen_columns.contains(&col.name) {
                seen_columns.insert(col.name.clone());
                column_names.push(col.name.clone());
            }
        }
    }

    let columns: Vec<Column> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), i))
        .collect();

    let col_index: BTreeMap<&str, usize> = columns
        .iter()
        .map(|c| (c.name.as_str(), c.index))
        .collect();

    let sources = tables
        .iter()
        .flat_map(|t| t.sources.iter().cloned())
        .collect();

    let mut rows: Vec<Row> = Vec::new();

    for table in &tables {
        // Column name -> index within this table
        let table_col_map: BTreeMap<&str, usize> = table
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.index))
            .collect();

        for row in &table.rows {
            let mut cells = vec![CellValue::Empty; columns.len()];

            for (col_name, &unified_idx) in &col_index {
                if let Some(&table_idx) = table_col_map.get(col_name) {
                    if let Some(cell) = row.cells.get(table_idx) {
                        cells[unified_idx] = cell.clone();
                    }
                }
            }

            rows.push(Row::new(cells));
        }
    }

    Ok(Table {
        columns,
        rows,
        sources,
    })
}

/// Concatenate tables, rejecting inputs whose column sets differ
///
/// Opt-in alternative to the union-with-fill default: every table must carry
/// exactly the first table's column names, in the same order.
pub fn concat_tables_strict(tables: Vec<Table>) -> Result<Table> {
    if tables.is_empty() {
        return Err(Error::NoInput);
    }

    let expected = tables[0].header().join(", ");
    for table in &tables[1..] {
        let found = table.header().join(", ");
        if found != expected {
            return Err(Error::SchemaMismatch {
                expected,
                found,
                path: table
                    .sources
                    .first()
                    .cloned()
                    .unwrap_or_default(),
            });
        }
    }

    concat_tables(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn table(name: &str, csv: &str) -> Table {
        parse_bytes(csv.as_bytes(), name).unwrap()
    }

    #[test]
    fn test_concat_single_table() {
        let t = table("base.csv", "ID,Name,Value\n1,foo,100\n2,bar,200\n");

        let result = concat_tables(vec![t]).unwrap();

        assert_eq!(result.columns.len(), 3);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].cells[0], CellValue::Int(1));
    }

    #[test]
    fn test_concat_row_count_is_sum() {
        let a = table("a.csv", "X\n1\n2\n3\n");
        let b = table("b.csv", "X\n4\n");
        let c = table("c.csv", "X\n5\n6\n");

        let result = concat_tables(vec![a, b, c]).unwrap();
        assert_eq!(result.row_count(), 6);
    }

    #[test]
    fn test_concat_preserves_row_order() {
        let a = table("a.csv", "Name\nfirst\nsecond\n");
        let b = table("b.csv", "Name\nthird\n");

        let result = concat_tables(vec![a, b]).unwrap();
        let names: Vec<String> = result
            .rows
            .iter()
            .map(|r| r.cells[0].to_display_string())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_concat_column_union_first_seen_order() {
        let a = table("a.csv", "A,B\n1,2\n");
        let b = table("b.csv", "B,C\n3,4\n");

        let result = concat_tables(vec![a, b]).unwrap();
        assert_eq!(result.header(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_concat_fills_missing_cells_with_empty() {
        let a = table("a.csv", "A,B\n1,2\n");
        let b = table("b.csv", "B,C\n3,4\n");

        let result = concat_tables(vec![a, b]).unwrap();

        // Row from a has no C, row from b has no A
        assert_eq!(result.rows[0].cells[2], CellValue::Empty);
        assert_eq!(result.rows[1].cells[0], CellValue::Empty);
        assert_eq!(result.rows[1].cells[1], CellValue::Int(3));
    }

    #[test]
    fn test_concat_empty_input_is_rejected() {
        let err = concat_tables(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::NoInput));
    }

    #[test]
    fn test_concat_collects_sources() {
        let a = table("a.csv", "X\n1\n");
        let b = table("b.csv", "X\n2\n");

        let result = concat_tables(vec![a, b]).unwrap();
        assert_eq!(
            result.sources,
            vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]
        );
    }

    #[test]
    fn test_merge_bytes_two_files() {
        let files = vec![
            ("file1.csv".to_string(), b"name,qty\nA,1\n".to_vec()),
            ("file2.csv".to_string(), b"name,qty\nB,2\n".to_vec()),
        ];

        let result = merge_bytes(&files).unwrap();

        assert_eq!(result.header(), vec!["name", "qty"]);
        assert_eq!(result.rows[0].cells[0], CellValue::Text("A".to_string()));
        assert_eq!(result.rows[0].cells[1], CellValue::Int(1));
        assert_eq!(result.rows[1].cells[0], CellValue::Text("B".to_string()));
        assert_eq!(result.rows[1].cells[1], CellValue::Int(2));
    }

    #[test]
    fn test_merge_bytes_failure_names_the_bad_file() {
        let files = vec![
            ("one.csv".to_string(), b"A\n1\n".to_vec()),
            ("two.xlsx".to_string(), b"not a workbook".to_vec()),
            ("three.csv".to_string(), b"A\n3\n".to_vec()),
        ];

        let err = merge_bytes(&files).unwrap_err();
        match err {
            Error::Workbook { path, .. } => {
                assert_eq!(path, PathBuf::from("two.xlsx"));
            }
            other => panic!("expected workbook error, got {other:?}"),
        }
    }

    #[test]
    fn test_strict_accepts_identical_schemas() {
        let a = table("a.csv", "A,B\n1,2\n");
        let b = table("b.csv", "A,B\n3,4\n");

        let result = concat_tables_strict(vec![a, b]).unwrap();
        assert_eq!(result.row_count(), 2);
    }

    #[test]
    fn test_strict_rejects_schema_mismatch() {
        let a = table("a.csv", "A,B\n1,2\n");
        let b = table("b.csv", "B,C\n3,4\n");

        let err = concat_tables_strict(vec![a, b]).unwrap_err();
        match err {
            Error::SchemaMismatch { path, .. } => {
                assert_eq!(path, PathBuf::from("b.csv"));
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }
}
