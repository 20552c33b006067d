//! Bounded operator-visible event journal.
//!
//! Every component that wants to surface an event to the dashboard appends
//! here; the buffer keeps only the most recent entries so the log list never
//! grows without bound.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Default number of journal entries kept for display.
pub const DEFAULT_CAPACITY: usize = 10;

/// Thread-safe FIFO log capped at a fixed entry count.
///
/// Readers and writers serialize through one mutex; this lock is independent
/// of the metrics lock and the two are never held together.
#[derive(Debug)]
pub struct EventJournal {
    entries: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl EventJournal {
    /// Create a journal holding at most `capacity` entries.
    ///
    /// A zero capacity is bumped to 1 so `append` always retains the newest
    /// entry.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append one entry, evicting the oldest when full.
    pub fn append(&self, message: impl Into<String>) {
        let message = message.into();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(message);
    }

    /// Current contents, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.iter().cloned().collect()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when no entries have been appended yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured entry cap.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
