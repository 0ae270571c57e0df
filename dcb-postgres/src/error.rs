use dcb_core::{Cursor, Query, StoreError};
use std::error::Error as StdError;
use thiserror::Error;

/// Represents all the ways a method can fail within the PostgreSQL backend.
#[derive(Error, Debug)]
pub enum Error {
    /// Error returned from the database.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    /// An error occurred while (de)serializing an event payload.
    #[error(transparent)]
    Serde(#[from] dcb_serde::Error),
    /// The append guard's query matched an event at or after `after`. Carries
    /// both so the caller can log or inspect what conflicted.
    #[error("concurrency conflict: an event matching {query:?} exists after {after:?}")]
    Concurrency { query: Query, after: Cursor },
    /// Any other failure surfaced by a handler or subsystem collaborator.
    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        match err {
            Error::Concurrency { query, after } => StoreError::ConcurrencyConflict { query, after },
            Error::Database(ref db) if is_transient(db) => {
                StoreError::TransientStorageError(err.to_string())
            }
            other => StoreError::Other(Box::new(other)),
        }
    }
}

fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
    )
}

impl dcb_core::decision::IsConcurrencyConflict for Error {
    fn is_concurrency_conflict(&self) -> bool {
        matches!(self, Error::Concurrency { .. })
    }
}

/// Maps a raw `sqlx::Error` to `Error::Concurrency` when the database reports
/// a serialization failure (SQLSTATE `40001`), and to `Error::Database`
/// otherwise. `query`/`after` are the append guard's own query and cursor,
/// carried into the error so callers can inspect what conflicted.
pub(crate) fn map_concurrency_err(err: sqlx::Error, query: &Query, after: Cursor) -> Error {
    if let sqlx::Error::Database(ref description) = err {
        if description.code().as_deref() == Some("40001") {
            return Error::Concurrency {
                query: query.clone(),
                after,
            };
        }
    }
    Error::Database(err)
}

/// True for SQLSTATEs / messages expected when a connection is torn down
/// mid-query during graceful shutdown, so the scheduler can log them at
/// `debug` instead of `error`.
pub fn is_shutdown_connection_error(err: &Error) -> bool {
    match err {
        Error::Database(sqlx::Error::Database(description)) => {
            matches!(description.code().as_deref(), Some("57P01") | Some("08006"))
        }
        Error::Database(sqlx::Error::PoolClosed) => true,
        Error::Database(sqlx::Error::Io(_)) => true,
        _ => false,
    }
}
