//! Per-processor checkpoint bookkeeping (spec C8).
use async_trait::async_trait;

/// A stable name for a processor, e.g. `"wallet-view-updater"`.
pub type ProcessorId = String;

/// A processor's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorStatus {
    Active,
    Paused,
    Failed,
}

impl Default for ProcessorStatus {
    fn default() -> Self {
        ProcessorStatus::Active
    }
}

/// The persisted checkpoint for one processor.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub last_position: i64,
    pub status: ProcessorStatus,
    pub error_count: u32,
    pub last_error: Option<String>,
}

/// Tracks per-processor progress. All writes go through the write data
/// source; implementations may route reads to a replica except where noted.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    type Error: Send + Sync;

    /// Idempotent insert of a fresh row (`last_position=0, status=Active`)
    /// if the processor is unknown; a no-op otherwise.
    async fn auto_register(
        &self,
        id: &ProcessorId,
        instance_id: &str,
    ) -> Result<(), Self::Error>;

    /// Returns the persisted position, `0` if the processor is unknown.
    async fn get_last_position(&self, id: &ProcessorId) -> Result<i64, Self::Error>;

    /// Upsert that never moves `last_position` backwards.
    async fn update_progress(&self, id: &ProcessorId, position: i64) -> Result<(), Self::Error>;

    /// Increments the error count and stores `message`; transitions to
    /// `Failed` once the count reaches `max_errors`.
    async fn record_error(
        &self,
        id: &ProcessorId,
        message: &str,
        max_errors: u32,
    ) -> Result<(), Self::Error>;

    /// Resets the error count to zero and the status to `Active`.
    async fn reset_error_count(&self, id: &ProcessorId) -> Result<(), Self::Error>;

    /// Sets the processor's status directly.
    async fn set_status(&self, id: &ProcessorId, status: ProcessorStatus) -> Result<(), Self::Error>;

    /// Returns `Active` if the processor is unknown.
    async fn get_status(&self, id: &ProcessorId) -> Result<ProcessorStatus, Self::Error>;

    /// Returns the gap between the log's current tip and this processor's
    /// last checkpointed position.
    async fn get_lag(&self, id: &ProcessorId) -> Result<i64, Self::Error>;
}
