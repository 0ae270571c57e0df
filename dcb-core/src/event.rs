//! Event represents an occurrence or action of interest within the system.
//!
//! This module defines the `Event` trait, which provides methods for
//! retrieving the tags associated with an event and the event's type name,
//! plus the `Cursor`/`PersistedEvent` types an event is wrapped in once the
//! store has assigned it a position.
use chrono::{DateTime, Utc};
use std::ops::Deref;

use crate::tags::TagSet;

/// Represents an event in the event store.
///
/// An event is an occurrence or action of interest within the system. The
/// `Event` trait provides methods for retrieving the tags associated with the
/// event and getting the event's type name. Implementors are typically enums
/// of an application's event family; `#[derive(Event)]` (behind the `macros`
/// feature) generates both methods from `#[tag]`-annotated variant fields.
pub trait Event {
    /// Retrieves the type name of the event, e.g. `"WalletOpened"`.
    fn event_type(&self) -> &'static str;
    /// Retrieves the tags associated with the event.
    fn tags(&self) -> TagSet;
}

/// A non-negative, strictly increasing position assigned by the store at
/// commit. `0` is reserved for the zero cursor; real events start at `1`.
pub type Position = i64;

/// An opaque transaction identifier. All events appended in one call to
/// `append`/`append_if` share one `tx_id`.
pub type TxId = i64;

/// An opaque point in the event log, ordered by `position` alone.
///
/// `tx_id` is retained on the cursor for cross-replica visibility/debugging
/// only: per the Open Question resolution in spec §9, the append guard
/// compares positions, never `tx_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub position: Position,
    pub occurred_at: DateTime<Utc>,
    pub tx_id: TxId,
}

impl Cursor {
    /// The zero cursor: a scan starting after it returns every event.
    pub const ZERO: Cursor = Cursor {
        position: 0,
        occurred_at: DateTime::<Utc>::MIN_UTC,
        tx_id: 0,
    };

    pub fn new(position: Position, occurred_at: DateTime<Utc>, tx_id: TxId) -> Self {
        Self {
            position,
            occurred_at,
            tx_id,
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::ZERO
    }
}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.position.cmp(&other.position)
    }
}

/// Wrapper for a persisted event.
///
/// It contains the cursor assigned by the event store and the event itself.
#[derive(Debug, Clone)]
pub struct PersistedEvent<E: Event> {
    pub(crate) cursor: Cursor,
    pub(crate) event: E,
}

impl<E: Event> PersistedEvent<E> {
    /// Creates a new `PersistedEvent` with the given cursor and event.
    pub fn new(cursor: Cursor, event: E) -> Self {
        Self { cursor, event }
    }

    /// Returns the inner event.
    pub fn into_inner(self) -> E {
        self.event
    }

    /// Retrieves the cursor assigned by the event store for this event.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Convenience accessor for the cursor's position.
    pub fn position(&self) -> Position {
        self.cursor.position
    }
}

impl<E: Event> Deref for PersistedEvent<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.event
    }
}

/// An event accepted by `append`/`append_if` before a position is assigned.
#[derive(Debug, Clone)]
pub struct AppendEvent<E> {
    pub event: E,
}

impl<E> AppendEvent<E> {
    pub fn new(event: E) -> Self {
        Self { event }
    }
}

impl<E> From<E> for AppendEvent<E> {
    fn from(event: E) -> Self {
        AppendEvent::new(event)
    }
}

/// A command record, associated with all events produced in its append
/// transaction via a shared `tx_id` (spec §3, optional/opt-in).
#[derive(Debug, Clone)]
pub struct CommandRecord {
    pub tx_id: TxId,
    pub command_type: String,
    pub data: Vec<u8>,
    pub metadata: Vec<u8>,
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursors_order_by_position_only() {
        let a = Cursor::new(1, Utc::now(), 99);
        let b = Cursor::new(2, Utc::now(), 1);
        assert!(a < b);
    }

    #[test]
    fn zero_cursor_sorts_first() {
        let a = Cursor::new(1, Utc::now(), 1);
        assert!(Cursor::ZERO < a);
    }
}
