//! SQL insert builder
//!
//! Builds the batch `INSERT INTO events (...) VALUES (...), (...) RETURNING
//! position, tx_id, occurred_at` statement for one `appendIf` call.
use dcb_core::event::TxId;
use dcb_core::Event;
use dcb_serde::Serde;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

/// Builds the batch insert query for the `events` table.
///
/// Every row in the batch shares the same `tx_id`, assigned once per append
/// call by the caller.
pub struct InsertEventsBuilder<'a, E, S>
where
    E: Event,
    S: Serde<E>,
{
    builder: sqlx::QueryBuilder<'a, Postgres>,
    events: &'a [E],
    serde: &'a S,
    tx_id: TxId,
}

impl<'a, E, S> InsertEventsBuilder<'a, E, S>
where
    E: Event,
    S: Serde<E>,
{
    pub fn new(events: &'a [E], serde: &'a S, tx_id: TxId) -> Self {
        Self {
            builder: sqlx::QueryBuilder::new(
                "INSERT INTO events (tx_id, event_type, tags, payload) ",
            ),
            events,
            serde,
            tx_id,
        }
    }

    /// Builds the SQL batch insert query. Panics if `events` is empty — the
    /// caller is expected to short-circuit `append_if` on an empty batch.
    pub fn build(&'a mut self) -> Query<'a, Postgres, PgArguments>
    where
        E: Clone,
    {
        if self.events.is_empty() {
            panic!("cannot build an insert query with no events");
        }

        self.builder.push_values(self.events, |mut b, event| {
            b.push_bind(self.tx_id);
            b.push_bind(event.event_type());
            b.push_bind(event.tags().to_wire_array());
            b.push_bind(self.serde.serialize(event.clone()));
        });
        self.builder
            .push(" RETURNING position, tx_id, occurred_at");

        self.builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcb_core::tags::TagSet;
    use dcb_serde::serde::json::Json;
    use serde::{Deserialize, Serialize};
    use sqlx::Execute;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum WalletEvent {
        Opened { wallet_id: String },
    }

    impl Event for WalletEvent {
        fn event_type(&self) -> &'static str {
            "Opened"
        }
        fn tags(&self) -> TagSet {
            match self {
                WalletEvent::Opened { wallet_id } => TagSet::new().with("wallet_id", wallet_id),
            }
        }
    }

    #[test]
    fn it_builds_a_batch_insert() {
        let events = &[WalletEvent::Opened {
            wallet_id: "w1".into(),
        }];
        let serde = Json::<WalletEvent>::default();
        let mut insert = InsertEventsBuilder::new(events, &serde, 7);
        assert_eq!(
            insert.build().sql(),
            "INSERT INTO events (tx_id, event_type, tags, payload) VALUES ($1, $2, $3, $4) RETURNING position, tx_id, occurred_at"
        );
    }
}
