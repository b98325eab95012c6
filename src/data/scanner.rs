// ============================================================
// Layer 4 — Class File Scanner
// ============================================================
// Finds the per-class .ndjson files for a run.
//
//   1. List regular files in the source directory
//   2. Sort by file name so label indices are stable
//   3. Keep names containing ".ndjson" (case-insensitive)
//   4. Pair each with the first class filter its lower-cased
//      name contains; files matching no filter are ignored
//
// The position in the resulting catalog is the label index.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::error::PrepareError;
use crate::domain::label::{ClassCatalog, ClassEntry};

pub struct ClassFileScanner {
    dir: PathBuf,
}

impl ClassFileScanner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn scan(&self, filters: &[String]) -> Result<ClassCatalog> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read source directory '{}'", self.dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        let lowered: Vec<String> = filters.iter().map(|f| f.to_lowercase()).collect();
        let mut entries = Vec::new();
        for name in names {
            let lower = name.to_lowercase();
            if !lower.contains(".ndjson") {
                continue;
            }
            if let Some(i) = lowered.iter().position(|f| lower.contains(f.as_str())) {
                tracing::debug!("Matched '{}' → class '{}'", name, filters[i]);
                entries.push(ClassEntry {
                    filter:    filters[i].clone(),
                    file_name: name,
                });
            }
        }

        if entries.is_empty() {
            return Err(PrepareError::NoMatchingFiles {
                dir:     self.dir.clone(),
                filters: filters.len(),
            }
            .into());
        }

        tracing::info!("Found {} matching class files", entries.len());
        Ok(ClassCatalog::new(entries))
    }

    pub fn path_of(&self, entry: &ClassEntry) -> PathBuf {
        self.dir.join(&entry.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn filters(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for f in ["dog.ndjson", "Cat.ndjson", "cat.txt", "zebra.ndjson"] {
            fs::write(dir.path().join(f), "").unwrap();
        }
        fs::create_dir(dir.path().join("cat.ndjson.d")).unwrap();

        let catalog = ClassFileScanner::new(dir.path())
            .scan(&filters(&["cat", "dog"]))
            .unwrap();
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["Cat.ndjson", "dog.ndjson"]);
        assert_eq!(catalog.entries()[0].filter, "cat");
        assert_eq!(catalog.width(), 2);
    }

    #[test]
    fn test_first_filter_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hot dog.ndjson"), "").unwrap();
        let catalog = ClassFileScanner::new(dir.path())
            .scan(&filters(&["hot dog", "dog"]))
            .unwrap();
        assert_eq!(catalog.width(), 1);
        assert_eq!(catalog.entries()[0].filter, "hot dog");
    }

    #[test]
    fn test_no_match_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cat.ndjson"), "").unwrap();
        let err = ClassFileScanner::new(dir.path())
            .scan(&filters(&["dog"]))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepareError>(),
            Some(PrepareError::NoMatchingFiles { .. })
        ));
    }
}
