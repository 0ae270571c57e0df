//! PostgreSQL Event Store
//!
//! Implements `dcb_core::EventStore` on top of a `events` table whose rows
//! carry a `tags TEXT[]` column (GIN-indexed) instead of per-event-type
//! identifier columns. The `appendIf` guard-plus-insert runs in one
//! `SERIALIZABLE` transaction, matching invariant 3 (atomic guard+write).
mod append;
mod query;
#[cfg(test)]
mod tests;

use append::InsertEventsBuilder;
use futures::stream::BoxStream;
use futures::StreamExt;
use query::push_criteria;
use sqlx::postgres::PgPool;
use sqlx::Row;
use std::marker::PhantomData;

use crate::error::map_concurrency_err;
use crate::{Error, Migrator};
use async_stream::stream;
use async_trait::async_trait;
use dcb_core::event::{Cursor, Position, TxId};
use dcb_core::event_store::{AppendCondition, EventStore};
use dcb_core::{Event, PersistedEvent, Query};
use dcb_serde::Serde;

/// PostgreSQL event store implementation.
#[derive(Clone)]
pub struct PgEventStore<E, S>
where
    S: Serde<E> + Send + Sync,
{
    pub(crate) pool: PgPool,
    serde: S,
    event_type: PhantomData<E>,
}

impl<E, S> PgEventStore<E, S>
where
    S: Serde<E> + Send + Sync + Clone,
    E: Event + Clone,
{
    /// Creates a new instance of `PgEventStore`, applying schema migrations
    /// first.
    pub async fn try_new(pool: PgPool, serde: S) -> Result<Self, Error> {
        Migrator::new(pool.clone()).run().await?;
        Ok(Self::new_uninitialized(pool, serde))
    }

    /// Creates a new instance of `PgEventStore` without running migrations.
    ///
    /// Use this when the schema (see `dcb-postgres::migrator`) has already
    /// been applied by other tooling.
    pub fn new_uninitialized(pool: PgPool, serde: S) -> Self {
        Self {
            pool,
            serde,
            event_type: PhantomData,
        }
    }
}

impl<E, S> PgEventStore<E, S>
where
    S: Serde<E> + Send + Sync,
    E: Event + Send + Sync,
{
    /// Streams events matching `query`, strictly after `after`, executed
    /// against `executor` (the pool for public reads, a transaction handle
    /// for the append guard).
    pub(crate) fn stream_with<'a, EX>(
        &'a self,
        executor: EX,
        query: &'a Query,
        after: Cursor,
    ) -> BoxStream<'a, Result<PersistedEvent<E>, Error>>
    where
        EX: sqlx::PgExecutor<'a> + Send + Sync + 'a,
    {
        let mut builder = sqlx::QueryBuilder::new(
            "SELECT position, tx_id, occurred_at, payload FROM events WHERE position > ",
        );
        builder.push_bind(after.position);
        builder.push(" AND (");
        push_criteria(&mut builder, query);
        builder.push(") ORDER BY position ASC");

        stream! {
            let mut rows = builder.build().fetch(executor);
            while let Some(row) = rows.next().await {
                let row = row?;
                let position: Position = row.get(0);
                let tx_id: TxId = row.get(1);
                let occurred_at = row.get(2);
                let payload: Vec<u8> = row.get(3);
                let event = self.serde.deserialize(payload)?;
                yield Ok(PersistedEvent::new(Cursor::new(position, occurred_at, tx_id), event));
            }
        }
        .boxed()
    }

    /// Runs the guard-plus-insert body shared by `append_if` and
    /// `append_if_with_command`: one `SERIALIZABLE` transaction that checks
    /// `condition`, inserts `events`, optionally inserts a `commands` row,
    /// and commits — mapping SQLSTATE `40001` to `Error::Concurrency`.
    async fn append_internal(
        &self,
        events: Vec<E>,
        condition: AppendCondition,
        command: Option<(&str, Vec<u8>, Vec<u8>)>,
    ) -> Result<Vec<PersistedEvent<E>>, Error>
    where
        E: Clone,
    {
        if events.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        if !condition.fail_if_events_match.is_never() {
            let mut guard = sqlx::QueryBuilder::new(
                "SELECT EXISTS (SELECT 1 FROM events WHERE position > ",
            );
            guard.push_bind(condition.after_cursor.position);
            guard.push(" AND (");
            push_criteria(&mut guard, &condition.fail_if_events_match);
            guard.push("))");

            let conflict: bool = guard.build_query_scalar().fetch_one(&mut *tx).await?;
            if conflict {
                return Err(Error::Concurrency {
                    query: condition.fail_if_events_match.clone(),
                    after: condition.after_cursor,
                });
            }
        }

        let tx_id: TxId = sqlx::query_scalar("SELECT nextval('seq_events_tx_id')")
            .fetch_one(&mut *tx)
            .await?;

        let mut insert = InsertEventsBuilder::new(&events, &self.serde, tx_id);
        let rows = insert.build().fetch_all(&mut *tx).await?;

        let persisted: Vec<PersistedEvent<E>> = rows
            .into_iter()
            .zip(events)
            .map(|(row, event)| {
                let position: Position = row.get(0);
                let tx_id: TxId = row.get(1);
                let occurred_at = row.get(2);
                PersistedEvent::new(Cursor::new(position, occurred_at, tx_id), event)
            })
            .collect();

        if let Some((command_type, data, metadata)) = command {
            sqlx::query(
                "INSERT INTO commands (tx_id, command_type, data, metadata) VALUES ($1, $2, $3, $4)",
            )
            .bind(tx_id)
            .bind(command_type)
            .bind(data)
            .bind(metadata)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await.map_err(|err| {
            map_concurrency_err(err, &condition.fail_if_events_match, condition.after_cursor)
        })?;

        Ok(persisted)
    }
}

#[async_trait]
impl<E, S> EventStore<E> for PgEventStore<E, S>
where
    E: Event + Send + Sync,
    S: Serde<E> + Send + Sync,
{
    type Error = Error;

    fn stream<'a>(
        &'a self,
        query: &'a Query,
        after: Cursor,
    ) -> BoxStream<'a, Result<PersistedEvent<E>, Self::Error>> {
        self.stream_with(&self.pool, query, after)
    }

    async fn append_if(
        &self,
        events: Vec<E>,
        condition: AppendCondition,
    ) -> Result<Vec<PersistedEvent<E>>, Self::Error>
    where
        E: Clone + 'async_trait,
    {
        self.append_internal(events, condition, None).await
    }

    async fn append_if_with_command(
        &self,
        events: Vec<E>,
        condition: AppendCondition,
        command_type: &str,
        command_data: Vec<u8>,
        command_metadata: Vec<u8>,
    ) -> Result<Vec<PersistedEvent<E>>, Self::Error>
    where
        E: Clone + 'async_trait,
    {
        self.append_internal(events, condition, Some((command_type, command_data, command_metadata)))
            .await
    }
}

