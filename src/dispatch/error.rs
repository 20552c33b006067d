//! Error types for request dispatch.

use thiserror::Error;

/// Why a single dispatch failed.
///
/// Failures are recorded in metrics and the journal and never unwind past
/// the dispatch boundary.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The request never produced a response (connection refused, DNS
    /// failure, timeout in the transport).
    #[error("request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-200 status.
    #[error("endpoint returned status {0}")]
    Status(u16),
}
