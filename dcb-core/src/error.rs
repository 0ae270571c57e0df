//! The behavioral error taxonomy a store/runtime implementation maps its
//! backend-specific failures onto (spec §7).
use thiserror::Error;

use crate::event::Cursor;
use crate::query::Query;

/// Errors any `EventStore`/`ProgressTracker`/`LeaderElector` implementation
/// surfaces to callers, independent of the backing storage technology.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The append guard's query matched an event at or after `after_cursor`:
    /// someone else appended first. Retryable, non-destructive. Carries the
    /// guard query and cursor so callers can log or inspect what conflicted.
    #[error("concurrency conflict: an event matching {query:?} exists after {after:?}")]
    ConcurrencyConflict { query: Query, after: Cursor },

    /// The caller supplied a malformed tag, query, or event payload.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A transient failure of the underlying storage (connection loss,
    /// timeout) that a caller may retry with backoff.
    #[error("transient storage error: {0}")]
    TransientStorageError(String),

    /// Any other backend failure that doesn't fit the above, wrapped
    /// transparently so the source error's `Display`/backtrace survive.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// True for failures spec classifies as retryable (conflicts and
    /// transient storage errors), false for everything else.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::ConcurrencyConflict { .. } | StoreError::TransientStorageError(_)
        )
    }
}

impl crate::decision::IsConcurrencyConflict for StoreError {
    fn is_concurrency_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrencyConflict { .. })
    }
}
