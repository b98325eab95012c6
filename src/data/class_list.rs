// ============================================================
// Layer 4 — Class List Reader
// ============================================================
// Reads the class-list CSV:
//
//   key,display name
//   cat,cat
//   eiffel,The Eiffel Tower
//
// There is no header row. Only the second column is used: it is
// the filter matched against file names in the source directory.

use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::error::PrepareError;

pub fn read_class_filters(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Cannot open class list '{}'", path.display()))?;

    let mut filters = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Cannot read class list '{}'", path.display()))?;
        let malformed = |reason: &str| PrepareError::MalformedClassList {
            path:   path.to_path_buf(),
            row:    i + 1,
            reason: reason.to_string(),
        };
        let name = row.get(1).ok_or_else(|| malformed("expected two columns"))?;
        if name.is_empty() {
            return Err(malformed("empty class name").into());
        }
        filters.push(name.to_string());
    }

    tracing::debug!("Read {} class filters from '{}'", filters.len(), path.display());
    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_second_column_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.csv");
        fs::write(&path, "0,cat\n1, The Eiffel Tower \n").unwrap();
        let filters = read_class_filters(&path).unwrap();
        assert_eq!(filters, vec!["cat", "The Eiffel Tower"]);
    }

    #[test]
    fn test_single_column_row_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classes.csv");
        fs::write(&path, "0,cat\ndog\n").unwrap();
        let err = read_class_filters(&path).unwrap_err();
        match err.downcast_ref::<PrepareError>() {
            Some(PrepareError::MalformedClassList { row, .. }) => assert_eq!(*row, 2),
            other => panic!("expected MalformedClassList, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(read_class_filters(Path::new("/definitely/not/here.csv")).is_err());
    }
}
