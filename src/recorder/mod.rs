//! Optional persistence of response bodies.
//!
//! When enabled, each successful response body is appended to a text log
//! under the results directory as a `Time:`/`Response:` record. Persistence
//! failures never affect outcome recording; the dispatcher logs them and
//! moves on.

use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// File name of the append-only response log inside the results directory.
const RESPONSE_LOG: &str = "responses.log";

/// Errors raised while persisting response bodies.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("failed to create results directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append to {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Appends timestamped response records to a file in the results directory.
pub struct ResponseRecorder {
    path: PathBuf,
}

impl ResponseRecorder {
    /// Create the results directory (if absent) and a recorder writing into
    /// it.
    pub fn new(directory: impl AsRef<Path>) -> Result<Self, RecorderError> {
        let directory = directory.as_ref();
        std::fs::create_dir_all(directory).map_err(|source| RecorderError::CreateDir {
            path: directory.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: directory.join(RESPONSE_LOG),
        })
    }

    /// Append one `Time: <RFC3339>\nResponse: <body>\n\n` record.
    pub async fn record(&self, body: &str) -> Result<(), RecorderError> {
        let entry = format!(
            "Time: {}\nResponse: {}\n\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            body
        );

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| RecorderError::Append {
                path: self.path.clone(),
                source,
            })?;

        file.write_all(entry.as_bytes())
            .await
            .map_err(|source| RecorderError::Append {
                path: self.path.clone(),
                source,
            })?;

        Ok(())
    }

    /// Path of the response log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_directory_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");

        let recorder = ResponseRecorder::new(&results).unwrap();
        recorder.record("ok").await.unwrap();
        recorder.record("{\"predictions\": [7]}").await.unwrap();

        let content = std::fs::read_to_string(recorder.path()).unwrap();
        let records: Vec<&str> = content.split("\n\n").filter(|r| !r.is_empty()).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].starts_with("Time: "));
        assert!(records[0].contains("\nResponse: ok"));
        assert!(records[1].contains("predictions"));
    }

    #[tokio::test]
    async fn test_existing_directory_reused() {
        let dir = tempfile::tempdir().unwrap();
        let first = ResponseRecorder::new(dir.path()).unwrap();
        first.record("a").await.unwrap();

        // Second recorder on the same directory appends, not truncates.
        let second = ResponseRecorder::new(dir.path()).unwrap();
        second.record("b").await.unwrap();

        let content = std::fs::read_to_string(second.path()).unwrap();
        assert!(content.contains("Response: a"));
        assert!(content.contains("Response: b"));
    }
}
