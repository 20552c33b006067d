//! Sample store for synthetic request payloads.
//!
//! Loads a file of numeric feature vectors once at startup and hands out
//! uniform-random samples to the bots. A `.json` suffix selects JSON decoding
//! (a top-level array of arrays of floats); anything else is treated as CSV
//! with one sample per row and one float per field, no header row.
//!
//! The store is immutable after load and safe to share across workers behind
//! an `Arc` without further synchronization.

mod error;

pub use error::SampleError;

use rand::Rng;
use std::path::Path;

/// Immutable collection of feature vectors.
#[derive(Debug)]
pub struct SampleStore {
    samples: Vec<Vec<f64>>,
}

impl SampleStore {
    /// Load samples from `path`, selecting the decoder by file extension.
    ///
    /// The load is atomic: any I/O error, malformed JSON, or unparsable CSV
    /// field fails the whole load, and an empty result is an error — a
    /// constructed store always holds at least one sample.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SampleError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SampleError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content)
        } else {
            Self::from_csv(&content)
        }
    }

    /// Parse a JSON array of float arrays.
    pub fn from_json(content: &str) -> Result<Self, SampleError> {
        let samples: Vec<Vec<f64>> = serde_json::from_str(content)?;
        Self::from_vec(samples)
    }

    /// Parse CSV rows of comma-separated floats.
    pub fn from_csv(content: &str) -> Result<Self, SampleError> {
        let mut samples = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut sample = Vec::new();
            for field in line.split(',') {
                let value = field.trim();
                let parsed = value.parse::<f64>().map_err(|_| SampleError::CsvValue {
                    line: idx + 1,
                    value: value.to_string(),
                })?;
                sample.push(parsed);
            }
            samples.push(sample);
        }

        Self::from_vec(samples)
    }

    /// Build a store from already-parsed vectors. Used by tests and by both
    /// decoders.
    pub fn from_vec(samples: Vec<Vec<f64>>) -> Result<Self, SampleError> {
        if samples.is_empty() {
            return Err(SampleError::Empty);
        }
        Ok(Self { samples })
    }

    /// Number of loaded samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Select one sample uniformly at random.
    ///
    /// Total on any constructed store, since construction rejects empty
    /// sample sets.
    pub fn random(&self) -> &[f64] {
        let index = rand::thread_rng().gen_range(0..self.samples.len());
        &self.samples[index]
    }
}
