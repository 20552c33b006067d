//! Error types for sample loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading the sample file.
///
/// All of these are fatal at startup: no bot starts with a partial or empty
/// sample set.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("failed to read sample file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode JSON samples: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse CSV value {value:?} on line {line}")]
    CsvValue { line: usize, value: String },

    #[error("sample file contains no samples")]
    Empty,
}
