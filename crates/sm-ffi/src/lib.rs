//! C FFI bindings for sm-core
//!
//! This crate provides a C-compatible API so a GUI shell can drive the
//! merge-export pipeline: merge files into an opaque table handle, read
//! cells for a preview, and write the export artifact to a file.

use sm_core::{export, merge_paths, Encoding, ExportOptions};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::PathBuf;
use std::ptr;

/// Opaque handle to a merged table
pub struct FfiTable {
    inner: sm_core::Table,
}

/// Merge spreadsheet files into a combined table
///
/// # Safety
/// - `paths` must be a valid pointer to an array of C strings
/// - `count` must be the correct length of the array
/// - Returns null on error
/// - The returned handle must be freed with `sm_free_table`
#[no_mangle]
pub unsafe extern "C" fn sm_merge_paths(paths: *const *const c_char, count: usize) -> *mut FfiTable {
    if paths.is_null() || count == 0 {
        return ptr::null_mut();
    }

    let input_paths: Vec<PathBuf> = (0..count)
        .filter_map(|i| {
            let ptr = *paths.add(i);
            if ptr.is_null() {
                None
            } else {
                CStr::from_ptr(ptr).to_str().ok().map(PathBuf::from)
            }
        })
        .collect();

    match merge_paths(&input_paths) {
        Ok(table) => Box::into_raw(Box::new(FfiTable { inner: table })),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a table handle
///
/// # Safety
/// - `table` must be a valid pointer returned by `sm_merge_paths` or null
#[no_mangle]
pub unsafe extern "C" fn sm_free_table(table: *mut FfiTable) {
    if !table.is_null() {
        drop(Box::from_raw(table));
    }
}

/// Get the row count of a merged table
///
/// # Safety
/// - `table` must be a valid pointer returned by `sm_merge_paths`
#[no_mangle]
pub unsafe extern "C" fn sm_table_row_count(table: *const FfiTable) -> usize {
    if table.is_null() {
        return 0;
    }
    (*table).inner.row_count()
}

/// Get the column count of a merged table
///
/// # Safety
/// - `table` must be a valid pointer returned by `sm_merge_paths`
#[no_mangle]
pub unsafe extern "C" fn sm_table_col_count(table: *const FfiTable) -> usize {
    if table.is_null() {
        return 0;
    }
    (*table).inner.column_count()
}

/// Get a column name by index
///
/// # Safety
/// - `table` must be a valid pointer returned by `sm_merge_paths`
/// - Returns null if index is out of bounds
/// - Caller must free the returned string with `sm_free_string`
#[no_mangle]
pub unsafe extern "C" fn sm_table_col_name(table: *const FfiTable, index: usize) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }

    (&(*table)
        .inner
        .columns)
        .get(index)
        .and_then(|c| CString::new(c.name.as_str()).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Get a cell value as a display string
///
/// # Safety
/// - `table` must be a valid pointer returned by `sm_merge_paths`
/// - Returns null if row or col is out of bounds
/// - Caller must free the returned string with `sm_free_string`
#[no_mangle]
pub unsafe extern "C" fn sm_table_cell(
    table: *const FfiTable,
    row: usize,
    col: usize,
) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }

    (&(*table)
        .inner
        .rows)
        .get(row)
        .and_then(|r| r.cells.get(col))
        .and_then(|c| CString::new(c.to_display_string()).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Serialize the merged table to a JSON string
///
/// # Safety
/// - `table` must be a valid pointer returned by `sm_merge_paths`
/// - Caller must free the returned string with `sm_free_string`
#[no_mangle]
pub unsafe extern "C" fn sm_table_to_json(table: *const FfiTable) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }

    serde_json::to_string(&(*table).inner)
        .ok()
        .and_then(|json| CString::new(json).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Export the merged table to a file
///
/// `encoding` is one of `"xlsx"`, `"csv"` or `"sqlite"`. `table_name` may be
/// null to use the default.
///
/// # Safety
/// - `table` must be a valid pointer returned by `sm_merge_paths`
/// - `encoding` and `out_path` must be valid C strings
/// - Returns 0 on success, -1 on error
#[no_mangle]
pub unsafe extern "C" fn sm_export_to_file(
    table: *const FfiTable,
    encoding: *const c_char,
    table_name: *const c_char,
    out_path: *const c_char,
) -> i32 {
    if table.is_null() || encoding.is_null() || out_path.is_null() {
        return -1;
    }

    let encoding: Encoding = match CStr::from_ptr(encoding).to_str().ok().and_then(|s| s.parse().ok()) {
        Some(e) => e,
        None => return -1,
    };

    let out_path = match CStr::from_ptr(out_path).to_str() {
        Ok(s) => PathBuf::from(s),
        Err(_) => return -1,
    };

    let table_name = if table_name.is_null() {
        None
    } else {
        match CStr::from_ptr(table_name).to_str() {
            Ok(s) => Some(s.to_string()),
            Err(_) => return -1,
        }
    };

    let options = ExportOptions { table_name };

    let bytes = match export(&(*table).inner, encoding, &options) {
        Ok(b) => b,
        Err(_) => return -1,
    };

    match std::fs::write(&out_path, bytes) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a sm_* function or null
#[no_mangle]
pub unsafe extern "C" fn sm_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
