//! Event fetcher (spec C7): turns a `Subscription` into a bounded batch of
//! events for one processor tick, combining the SQL-level containment query
//! with the subscription's Rust-level post-filter.
use futures::StreamExt;

use crate::event_store::PgEventStore;
use crate::Error;
use dcb_core::event::Cursor;
use dcb_core::event_store::EventStore;
use dcb_core::{Event, PersistedEvent, Subscription};
use dcb_serde::Serde;

pub struct PgEventFetcher<'a, E, S>
where
    S: Serde<E> + Send + Sync,
{
    store: &'a PgEventStore<E, S>,
}

impl<'a, E, S> PgEventFetcher<'a, E, S>
where
    E: Event + Send + Sync,
    S: Serde<E> + Send + Sync,
{
    pub fn new(store: &'a PgEventStore<E, S>) -> Self {
        Self { store }
    }

    /// Fetches up to `batch_size` events matching `subscription`, strictly
    /// after `after`.
    ///
    /// `any_of_tags`/multi-value `exact_tags` in `subscription` don't reduce
    /// to a single containment expression, so the SQL query narrows on
    /// `event_types`/`exact_tags` alone and this over-fetches by a small
    /// factor to leave room for the post-filter to discard candidates
    /// without starving the batch.
    pub async fn fetch_events(
        &self,
        subscription: &Subscription,
        after: Cursor,
        batch_size: usize,
    ) -> Result<Vec<PersistedEvent<E>>, Error> {
        let query = subscription.compile();
        let mut stream = self.store.stream(&query, after).take(batch_size * 4);
        let mut batch = Vec::with_capacity(batch_size);
        while let Some(event) = stream.next().await {
            let event = event?;
            if subscription.matches_post_filter(&*event) {
                batch.push(event);
                if batch.len() >= batch_size {
                    break;
                }
            }
        }
        Ok(batch)
    }
}
