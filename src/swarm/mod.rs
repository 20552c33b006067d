//! Bot pool and coordinated shutdown.
//!
//! The swarm owns N independent periodic workers. Each worker draws a random
//! sample on every tick and fires the dispatch as its own task without
//! waiting for it; a failed dispatch never terminates a worker. All workers
//! observe one shared `CancellationToken` on every tick-wait and exit their
//! loop as soon as it fires.
//!
//! In-flight dispatch count is unbounded by design: there is no admission
//! control, so a fast tick rate with many bots can stack up concurrent
//! requests.

use crate::dispatch::Dispatcher;
use crate::journal::EventJournal;
use crate::samples::SampleStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A pool of ticking workers sharing one dispatcher and sample store.
pub struct Swarm {
    dispatcher: Arc<Dispatcher>,
    store: Arc<SampleStore>,
    journal: Arc<EventJournal>,
    bots: usize,
    interval: Duration,
}

impl Swarm {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        store: Arc<SampleStore>,
        journal: Arc<EventJournal>,
        bots: usize,
        interval: Duration,
    ) -> Self {
        Self {
            dispatcher,
            store,
            journal,
            bots,
            interval,
        }
    }

    /// Spawn all workers and return a handle that coordinates their
    /// shutdown.
    pub fn start(self, cancel: CancellationToken) -> SwarmHandle {
        self.journal.append(format!(
            "Starting {} bots at {}s intervals...",
            self.bots,
            self.interval.as_secs()
        ));
        tracing::info!(bots = self.bots, interval = ?self.interval, "Swarm started");

        let workers = (0..self.bots)
            .map(|index| {
                let worker = BotWorker {
                    index,
                    dispatcher: Arc::clone(&self.dispatcher),
                    store: Arc::clone(&self.store),
                    journal: Arc::clone(&self.journal),
                    interval: self.interval,
                };
                tokio::spawn(worker.run(cancel.clone()))
            })
            .collect();

        SwarmHandle {
            cancel,
            workers,
            journal: self.journal,
        }
    }
}

/// One periodic worker. Owns no shared data, only its cadence and references
/// to the injected dispatcher, store, and journal.
struct BotWorker {
    index: usize,
    dispatcher: Arc<Dispatcher>,
    store: Arc<SampleStore>,
    journal: Arc<EventJournal>,
    interval: Duration,
}

impl BotWorker {
    async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.journal
                        .append(format!("Bot {} stopping gracefully...", self.index));
                    tracing::info!(bot = self.index, "bot stopping");
                    break;
                }
                _ = interval.tick() => {
                    // Fire and forget: the tick loop never blocks on the
                    // dispatch, so a dispatch spawned on the final tick may
                    // still be in flight when this loop exits.
                    let sample = self.store.random().to_vec();
                    let dispatcher = Arc::clone(&self.dispatcher);
                    tokio::spawn(async move {
                        dispatcher.send(&sample).await;
                    });
                }
            }
        }
    }
}

/// Handle over the running workers.
pub struct SwarmHandle {
    cancel: CancellationToken,
    workers: Vec<JoinHandle<()>>,
    journal: Arc<EventJournal>,
}

impl SwarmHandle {
    /// Signal all workers to stop. Idempotent: repeated calls are no-ops.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Number of workers spawned.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Cancel (if not already cancelled) and wait for every worker's tick
    /// loop to exit.
    ///
    /// Only the tick loops are awaited. Dispatches spawned just before
    /// cancellation run to completion on their own and may record outcomes
    /// after this returns; the last of them races process exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();

        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "bot task panicked");
            }
        }

        self.journal.append("All bots stopped.");
        tracing::info!("All bots stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::LoadMetrics;

    fn test_swarm(bots: usize, interval: Duration) -> Swarm {
        let metrics = Arc::new(LoadMetrics::new());
        let journal = Arc::new(EventJournal::default());
        // Nothing listens on this port range in tests; dispatches fail fast
        // as transport errors, which the workers must survive.
        let dispatcher = Arc::new(Dispatcher::new(
            "http://127.0.0.1:9/predict".to_string(),
            metrics,
            Arc::clone(&journal),
        ));
        let store = Arc::new(SampleStore::from_vec(vec![vec![1.0, 2.0]]).unwrap());
        Swarm::new(dispatcher, store, journal, bots, interval)
    }

    #[tokio::test]
    async fn test_workers_spawned_per_bot() {
        let handle = test_swarm(4, Duration::from_secs(60)).start(CancellationToken::new());
        assert_eq!(handle.worker_count(), 4);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_exits_within_a_tick() {
        let handle = test_swarm(3, Duration::from_millis(20)).start(CancellationToken::new());

        tokio::time::sleep(Duration::from_millis(50)).await;

        let shutdown = handle.shutdown();
        tokio::time::timeout(Duration::from_millis(500), shutdown)
            .await
            .expect("tick loops should exit promptly after cancellation");
    }

    #[tokio::test]
    async fn test_double_cancel_is_idempotent() {
        let handle = test_swarm(2, Duration::from_millis(10)).start(CancellationToken::new());

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());

        tokio::time::timeout(Duration::from_millis(500), handle.shutdown())
            .await
            .expect("shutdown after repeated cancel must still complete");
    }

    #[tokio::test]
    async fn test_workers_log_termination() {
        let metrics = Arc::new(LoadMetrics::new());
        let journal = Arc::new(EventJournal::with_capacity(16));
        let dispatcher = Arc::new(Dispatcher::new(
            "http://127.0.0.1:9/predict".to_string(),
            metrics,
            Arc::clone(&journal),
        ));
        let store = Arc::new(SampleStore::from_vec(vec![vec![0.5]]).unwrap());

        let swarm = Swarm::new(dispatcher, store, Arc::clone(&journal), 2, Duration::from_secs(60));
        let handle = swarm.start(CancellationToken::new());
        handle.shutdown().await;

        let entries = journal.snapshot();
        assert!(entries.iter().any(|e| e.contains("Starting 2 bots")));
        assert_eq!(
            entries
                .iter()
                .filter(|e| e.contains("stopping gracefully"))
                .count(),
            2
        );
        assert!(entries.last().unwrap().contains("All bots stopped."));
    }

    #[tokio::test]
    async fn test_dispatch_failures_do_not_kill_workers() {
        // Endpoint is unreachable, so every dispatch fails; the tick loops
        // must keep running until cancelled.
        let metrics = Arc::new(LoadMetrics::new());
        let journal = Arc::new(EventJournal::default());
        let dispatcher = Arc::new(Dispatcher::new(
            "http://127.0.0.1:9/predict".to_string(),
            Arc::clone(&metrics),
            Arc::clone(&journal),
        ));
        let store = Arc::new(SampleStore::from_vec(vec![vec![1.0]]).unwrap());

        let swarm = Swarm::new(dispatcher, store, journal, 1, Duration::from_millis(10));
        let handle = swarm.start(CancellationToken::new());

        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.shutdown().await;

        // Give stragglers a moment to record.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let snap = metrics.snapshot();
        assert!(snap.total_requests >= 2);
        assert_eq!(snap.failed_requests, snap.total_requests);
    }
}
