//! Directory scanner for discovering tabular input files

use crate::error::Result;
use crate::parser::WORKBOOK_EXTENSIONS;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walk the given roots and collect every supported tabular file
///
/// Results are sorted by path so the merge order is deterministic regardless
/// of filesystem iteration order.
pub fn find_tabular_files<P: AsRef<Path>>(roots: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root.as_ref()).follow_links(true) {
            let entry = entry?;
            if entry.file_type().is_file() && is_supported(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ext.eq_ignore_ascii_case("csv")
                || WORKBOOK_EXTENSIONS
                    .iter()
                    .any(|s| ext.eq_ignore_ascii_case(s))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_tabular_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.xlsx"), b"").unwrap();
        fs::write(dir.path().join("a.csv"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let files = find_tabular_files(&[dir.path()]).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.xlsx"]);
    }

    #[test]
    fn test_find_tabular_files_recurses() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/inner.csv"), b"").unwrap();

        let files = find_tabular_files(&[dir.path()]).unwrap();
        assert_eq!(files.len(), 1);
    }
}
