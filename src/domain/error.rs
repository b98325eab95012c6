// ============================================================
// Layer 3 — Dataset Preparation Errors
// ============================================================
// Every variant is fatal: the run aborts with the diagnostic
// and nothing is retried. The application layer wraps these
// in anyhow so the CLI prints the full context chain.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("class list '{path}' row {row}: {reason}")]
    MalformedClassList {
        path:   PathBuf,
        row:    usize,
        reason: String,
    },

    #[error("no .ndjson files in '{dir}' match any of the {filters} class filters")]
    NoMatchingFiles { dir: PathBuf, filters: usize },

    #[error("cannot read '{path}'")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid partitioning: {0}")]
    InvalidPartitioning(String),

    #[error("class file '{path}' has {available} lines but {required} are required")]
    ShortClassFile {
        path:      PathBuf,
        required:  usize,
        available: usize,
    },

    #[error("malformed record in '{path}' at line {line}: {reason}")]
    MalformedRecord {
        path:   PathBuf,
        line:   usize,
        reason: String,
    },
}
