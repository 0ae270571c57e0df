//! Routes a batch of fetched events to a processor-specific sink (spec C12).
use async_trait::async_trait;
use thiserror::Error;

use crate::event::PersistedEvent;

/// A failure raised by an `EventHandler`. The scheduler records it via
/// `ProgressTracker::record_error` and does not advance progress.
#[derive(Debug, Error)]
#[error("handler failed: {0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Handles a batch of events fetched for one processor.
///
/// Implementations **must** be idempotent or at-least-once tolerant: progress
/// is advanced only after `handle` returns successfully, so a crash between
/// handling and checkpointing redelivers the same batch.
#[async_trait]
pub trait EventHandler<E>: Send + Sync {
    /// Handles `batch`, returning the number of events actually handled.
    async fn handle(&self, batch: &[PersistedEvent<E>]) -> Result<usize, HandlerError>;
}
