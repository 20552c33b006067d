//! Request dispatch against the target endpoint.
//!
//! One `send` call is one HTTP POST of a single sample, independently
//! schedulable: any number of dispatches may be in flight concurrently.
//! Every invocation records exactly one metrics update and one journal
//! entry, whatever the outcome.

mod error;

pub use error::DispatchError;

use crate::journal::EventJournal;
use crate::metrics::LoadMetrics;
use crate::recorder::ResponseRecorder;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Wire payload: `{"instances": [[v1, v2, ...]]}` with one sample per
/// request.
#[derive(Debug, Serialize)]
struct InferencePayload<'a> {
    instances: Vec<&'a [f64]>,
}

/// Classified result of a single dispatch.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// HTTP 200; wall-clock latency from just before send.
    Success { latency_ms: f64 },
    /// Transport failure or non-200 status.
    Failure { error: DispatchError },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Issues requests and folds each outcome into the shared metrics and
/// journal.
pub struct Dispatcher {
    client: reqwest::Client,
    endpoint: String,
    metrics: Arc<LoadMetrics>,
    journal: Arc<EventJournal>,
    recorder: Option<ResponseRecorder>,
}

impl Dispatcher {
    /// Create a dispatcher with a default HTTP client.
    ///
    /// No total request timeout is configured; the transport defaults apply,
    /// matching the documented gap in the shutdown protocol.
    pub fn new(endpoint: String, metrics: Arc<LoadMetrics>, journal: Arc<EventJournal>) -> Self {
        let client = reqwest::Client::new();
        Self::with_client(endpoint, metrics, journal, client)
    }

    /// Create a dispatcher with a custom HTTP client (for testing).
    pub fn with_client(
        endpoint: String,
        metrics: Arc<LoadMetrics>,
        journal: Arc<EventJournal>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            endpoint,
            metrics,
            journal,
            recorder: None,
        }
    }

    /// Persist successful response bodies through `recorder`.
    pub fn with_recorder(mut self, recorder: ResponseRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Target endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one sample and record the classified outcome.
    ///
    /// A single attempt: transient errors surface as `Outcome::Failure`,
    /// never as retries.
    pub async fn send(&self, sample: &[f64]) -> Outcome {
        let payload = InferencePayload {
            instances: vec![sample],
        };

        let start = Instant::now();
        let response = self.client.post(&self.endpoint).json(&payload).send().await;

        let outcome = match response {
            Err(e) => Outcome::Failure {
                error: DispatchError::Transport(e.to_string()),
            },
            Ok(response) => {
                let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                if response.status() == reqwest::StatusCode::OK {
                    self.persist_body(response).await;
                    Outcome::Success { latency_ms }
                } else {
                    Outcome::Failure {
                        error: DispatchError::Status(response.status().as_u16()),
                    }
                }
            }
        };

        self.record(&outcome);
        outcome
    }

    /// Exactly one metrics update and one journal append per dispatch.
    fn record(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Success { latency_ms } => {
                self.metrics.record_success(*latency_ms);
                self.journal
                    .append(format!("Request succeeded, latency {:.2} ms", latency_ms));
                tracing::debug!(latency_ms, "dispatch succeeded");
            }
            Outcome::Failure { error } => {
                self.metrics.record_failure();
                self.journal.append(format!("Request failed: {}", error));
                tracing::warn!(error = %error, "dispatch failed");
            }
        }
    }

    /// Append the response body to the results log when recording is
    /// enabled; otherwise discard it. Persistence errors are logged only.
    async fn persist_body(&self, response: reqwest::Response) {
        let Some(recorder) = &self.recorder else {
            return;
        };

        match response.text().await {
            Ok(body) => {
                if let Err(e) = recorder.record(&body).await {
                    tracing::warn!(error = %e, "failed to persist response body");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read response body for persistence");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let sample = [1.0, 2.5, 3.0];
        let payload = InferencePayload {
            instances: vec![&sample],
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"instances": [[1.0, 2.5, 3.0]]}));
    }

    #[test]
    fn test_outcome_classification() {
        let success = Outcome::Success { latency_ms: 12.0 };
        assert!(success.is_success());

        let failure = Outcome::Failure {
            error: DispatchError::Status(500),
        };
        assert!(!failure.is_success());
        if let Outcome::Failure { error } = failure {
            assert_eq!(error.to_string(), "endpoint returned status 500");
        }
    }

    #[test]
    fn test_transport_error_display() {
        let error = DispatchError::Transport("connection refused".to_string());
        assert_eq!(error.to_string(), "request failed: connection refused");
    }
}
