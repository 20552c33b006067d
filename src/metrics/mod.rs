//! Request metrics aggregation.
//!
//! Every completed dispatch lands here exactly once. All counters and the
//! latency sequence live behind a single mutex so readers never observe a
//! partially-updated aggregate; the dashboard polls `snapshot()` for a
//! consistent copy.
//!
//! Counter/histogram events are also emitted through the `metrics` facade
//! (`barrage_requests_total`, `barrage_request_latency_ms`); they are no-ops
//! unless a recorder is installed.

use std::sync::{Mutex, PoisonError};

/// Consistent point-in-time copy of the aggregate, for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub success_requests: u64,
    pub failed_requests: u64,
    /// Arithmetic mean over all recorded latencies; 0.0 until the first
    /// success.
    pub average_latency_ms: f64,
}

#[derive(Debug, Default)]
struct Inner {
    total_requests: u64,
    success_requests: u64,
    failed_requests: u64,
    /// Append-only; kept so the mean is recomputable from raw values.
    latencies: Vec<f64>,
    latency_sum_ms: f64,
    average_latency_ms: f64,
}

/// Thread-safe accumulator for dispatch outcomes.
///
/// Invariant: `total_requests == success_requests + failed_requests` at
/// every quiescent point, and `average_latency_ms` is the mean of
/// `latencies` whenever any success has been recorded.
#[derive(Debug, Default)]
pub struct LoadMetrics {
    inner: Mutex<Inner>,
}

impl LoadMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful dispatch with its wall-clock latency.
    pub fn record_success(&self, latency_ms: f64) {
        {
            let mut inner = self.lock();
            inner.total_requests += 1;
            inner.success_requests += 1;
            inner.latencies.push(latency_ms);
            inner.latency_sum_ms += latency_ms;
            // Running sum/count; observably identical to a full recompute.
            inner.average_latency_ms = inner.latency_sum_ms / inner.latencies.len() as f64;
        }

        metrics::counter!("barrage_requests_total", "outcome" => "success").increment(1);
        metrics::histogram!("barrage_request_latency_ms").record(latency_ms);
    }

    /// Record one failed dispatch. The latency sequence and mean are
    /// untouched.
    pub fn record_failure(&self) {
        {
            let mut inner = self.lock();
            inner.total_requests += 1;
            inner.failed_requests += 1;
        }

        metrics::counter!("barrage_requests_total", "outcome" => "failure").increment(1);
    }

    /// Point-in-time copy of all counters and the derived mean.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.lock();
        MetricsSnapshot {
            total_requests: inner.total_requests,
            success_requests: inner.success_requests,
            failed_requests: inner.failed_requests,
            average_latency_ms: inner.average_latency_ms,
        }
    }

    /// Raw latency values recorded so far, in recording order.
    pub fn latencies(&self) -> Vec<f64> {
        self.lock().latencies.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_initial_snapshot_is_zero() {
        let metrics = LoadMetrics::new();
        let snap = metrics.snapshot();

        assert_eq!(snap.total_requests, 0);
        assert_eq!(snap.success_requests, 0);
        assert_eq!(snap.failed_requests, 0);
        assert_eq!(snap.average_latency_ms, 0.0);
    }

    #[test]
    fn test_success_updates_counters_and_mean() {
        let metrics = LoadMetrics::new();
        metrics.record_success(10.0);
        metrics.record_success(20.0);

        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 2);
        assert_eq!(snap.success_requests, 2);
        assert_eq!(snap.failed_requests, 0);
        assert!((snap.average_latency_ms - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failure_leaves_mean_untouched() {
        let metrics = LoadMetrics::new();
        metrics.record_success(40.0);
        metrics.record_failure();
        metrics.record_failure();

        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 3);
        assert_eq!(snap.success_requests, 1);
        assert_eq!(snap.failed_requests, 2);
        assert!((snap.average_latency_ms - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failures_only_mean_stays_zero() {
        let metrics = LoadMetrics::new();
        for _ in 0..5 {
            metrics.record_failure();
        }

        let snap = metrics.snapshot();
        assert_eq!(snap.failed_requests, 5);
        assert_eq!(snap.average_latency_ms, 0.0);
    }

    #[test]
    fn test_mean_matches_recorded_latencies() {
        let metrics = LoadMetrics::new();
        let values = [3.5, 7.25, 120.0, 0.5, 42.0];
        for v in values {
            metrics.record_success(v);
        }

        let expected: f64 = values.iter().sum::<f64>() / values.len() as f64;
        let snap = metrics.snapshot();
        assert!((snap.average_latency_ms - expected).abs() < 1e-9);
        assert_eq!(metrics.latencies(), values.to_vec());
    }

    #[test]
    fn test_concurrent_recording_preserves_invariant() {
        let metrics = Arc::new(LoadMetrics::new());
        let mut handles = Vec::new();

        for t in 0..8 {
            let metrics = Arc::clone(&metrics);
            handles.push(std::thread::spawn(move || {
                for i in 0..500 {
                    if (t + i) % 3 == 0 {
                        metrics.record_failure();
                    } else {
                        metrics.record_success(1.0 + i as f64);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 8 * 500);
        assert_eq!(
            snap.total_requests,
            snap.success_requests + snap.failed_requests
        );

        let latencies = metrics.latencies();
        assert_eq!(latencies.len() as u64, snap.success_requests);
        let mean: f64 = latencies.iter().sum::<f64>() / latencies.len() as f64;
        assert!((snap.average_latency_ms - mean).abs() < 1e-6);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any interleaving of successes and failures keeps the counter
            /// identity and the mean equal to the mean of recorded values.
            #[test]
            fn prop_counters_and_mean_consistent(
                events in proptest::collection::vec(
                    proptest::option::weighted(0.7, 0.01f64..5000.0),
                    0..200,
                ),
            ) {
                let metrics = LoadMetrics::new();
                let mut expected: Vec<f64> = Vec::new();

                for event in &events {
                    match event {
                        Some(latency) => {
                            metrics.record_success(*latency);
                            expected.push(*latency);
                        }
                        None => metrics.record_failure(),
                    }
                }

                let snap = metrics.snapshot();
                prop_assert_eq!(snap.total_requests as usize, events.len());
                prop_assert_eq!(
                    snap.total_requests,
                    snap.success_requests + snap.failed_requests
                );

                if expected.is_empty() {
                    prop_assert_eq!(snap.average_latency_ms, 0.0);
                } else {
                    let mean: f64 = expected.iter().sum::<f64>() / expected.len() as f64;
                    prop_assert!((snap.average_latency_ms - mean).abs() < 1e-6);
                }
            }
        }
    }
}
