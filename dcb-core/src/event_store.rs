//! Event store is responsible for storing and retrieving events.
//!
//! It is designed to be implemented by different storage backends, such as
//! databases or distributed event sourcing systems. Implementations of this
//! trait should handle event persistence, querying, and conflict resolution
//! in a way that aligns with the specific requirements and constraints of
//! the underlying storage system.
//!
//! For more details and specific implementations, refer to the trait
//! documentation and the `dcb-postgres` implementation.
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::event::{Cursor, Event, PersistedEvent};
use crate::query::Query;

/// The guard a write is conditioned on: the append fails if any event
/// matching `fail_if_events_match` exists strictly after `after_cursor`.
///
/// `AppendCondition::none()` (query `Query::never()`) always succeeds, for
/// callers with no uniqueness requirement.
#[derive(Debug, Clone)]
pub struct AppendCondition {
    pub fail_if_events_match: Query,
    pub after_cursor: Cursor,
}

impl AppendCondition {
    pub fn new(fail_if_events_match: Query, after_cursor: Cursor) -> Self {
        Self {
            fail_if_events_match,
            after_cursor,
        }
    }

    /// No concurrency check: the append always succeeds.
    pub fn none() -> Self {
        Self {
            fail_if_events_match: Query::never(),
            after_cursor: Cursor::ZERO,
        }
    }
}

/// An event store.
///
/// This trait provides methods for streaming events and appending events to
/// the event store.
#[async_trait]
pub trait EventStore<E>
where
    E: Event + Send + Sync,
{
    type Error: Send + Sync;

    /// Streams events matching `query`, strictly after `after`.
    fn stream<'a>(
        &'a self,
        query: &'a Query,
        after: Cursor,
    ) -> BoxStream<'a, Result<PersistedEvent<E>, Self::Error>>;

    /// Appends a batch of events with no concurrency check.
    ///
    /// Equivalent to `append_if` with `AppendCondition::none()`. Useful when
    /// the caller already knows the write cannot conflict (e.g. a brand-new
    /// stream with a caller-enforced unique tag).
    async fn append(&self, events: Vec<E>) -> Result<Vec<PersistedEvent<E>>, Self::Error>
    where
        E: Clone + 'async_trait,
    {
        self.append_if(events, AppendCondition::none()).await
    }

    /// Appends a batch of events, failing the whole batch if `condition`'s
    /// guard query matches any event committed after `condition.after_cursor`.
    ///
    /// Implementations must evaluate the guard and perform the insert in one
    /// serializable transaction so that a concurrent append cannot slip in
    /// between the check and the write.
    async fn append_if(
        &self,
        events: Vec<E>,
        condition: AppendCondition,
    ) -> Result<Vec<PersistedEvent<E>>, Self::Error>
    where
        E: Clone + 'async_trait;

    /// Like `append_if`, but also inserts one `CommandRecord` row in the same
    /// transaction, associated with the appended events via a shared `tx_id`.
    async fn append_if_with_command(
        &self,
        events: Vec<E>,
        condition: AppendCondition,
        command_type: &str,
        command_data: Vec<u8>,
        command_metadata: Vec<u8>,
    ) -> Result<Vec<PersistedEvent<E>>, Self::Error>
    where
        E: Clone + 'async_trait;
}
