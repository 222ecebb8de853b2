//! Store error types

use thiserror::Error;

/// Result type for fallible store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the store.
///
/// Reconciliation and fetch misses never produce these; only snapshot I/O and
/// decoding do.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(#[source] serde_json::Error),

    #[error("failed to encode snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
}
