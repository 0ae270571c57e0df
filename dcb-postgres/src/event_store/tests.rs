//! Live-database integration tests. Gated behind `DATABASE_URL`; run with
//! `cargo test -- --ignored` against a disposable Postgres instance that has
//! already had `dcb-postgres::migrator::Migrator::run` applied.
use std::env;

use dcb_core::event_store::{AppendCondition, EventStore};
use dcb_core::{tags, Cursor, Event, Query, TagSet};
use dcb_serde::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::event_store::PgEventStore;
use crate::migrator::Migrator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum WalletEvent {
    Opened { wallet_id: String },
    Transferred { from_wallet_id: String, to_wallet_id: String, amount: i64 },
}

impl Event for WalletEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WalletEvent::Opened { .. } => "Opened",
            WalletEvent::Transferred { .. } => "Transferred",
        }
    }
    fn tags(&self) -> TagSet {
        match self {
            WalletEvent::Opened { wallet_id } => tags! { wallet_id: wallet_id },
            WalletEvent::Transferred { from_wallet_id, to_wallet_id, .. } => {
                tags! { from_wallet_id: from_wallet_id, to_wallet_id: to_wallet_id }
            }
        }
    }
}

async fn store() -> PgEventStore<WalletEvent, Json<WalletEvent>> {
    let url = env::var("DATABASE_URL").expect("DATABASE_URL must be set for live-db tests");
    let pool = PgPool::connect(&url).await.unwrap();
    Migrator::new(pool.clone()).run().await.unwrap();
    PgEventStore::new_uninitialized(pool, Json::default())
}

#[tokio::test]
#[ignore]
async fn it_assigns_strictly_increasing_positions() {
    let store = store().await;
    let events = vec![
        WalletEvent::Opened { wallet_id: "w1".into() },
        WalletEvent::Opened { wallet_id: "w2".into() },
    ];
    let persisted = store.append(events).await.unwrap();
    assert!(persisted[0].position() < persisted[1].position());
}

#[tokio::test]
#[ignore]
async fn it_rejects_a_conflicting_append_under_the_guard() {
    let store = store().await;
    let wallet_id = uuid_like();
    let query = Query::new(vec![dcb_core::query::QueryItem::new(
        ["Opened"],
        tags! { wallet_id: &wallet_id },
    )]);

    store
        .append(vec![WalletEvent::Opened { wallet_id: wallet_id.clone() }])
        .await
        .unwrap();

    let result = store
        .append_if(
            vec![WalletEvent::Opened { wallet_id: wallet_id.clone() }],
            AppendCondition::new(query, Cursor::ZERO),
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
#[ignore]
async fn it_ors_across_query_items_s2() {
    // S2 from spec §8: Query = [{Transferred, from=w1}, {Transferred, to=w1}]
    let store = store().await;
    let w1 = uuid_like();
    let w2 = uuid_like();
    let w3 = uuid_like();

    store
        .append(vec![
            WalletEvent::Transferred { from_wallet_id: w1.clone(), to_wallet_id: w2.clone(), amount: 10 },
            WalletEvent::Transferred { from_wallet_id: w3.clone(), to_wallet_id: w1.clone(), amount: 5 },
            WalletEvent::Transferred { from_wallet_id: w3.clone(), to_wallet_id: w2.clone(), amount: 1 },
        ])
        .await
        .unwrap();

    let query = Query::new(vec![
        dcb_core::query::QueryItem::new(["Transferred"], tags! { from_wallet_id: &w1 }),
        dcb_core::query::QueryItem::new(["Transferred"], tags! { to_wallet_id: &w1 }),
    ]);

    let matched: Vec<_> = futures::StreamExt::collect::<Vec<_>>(store.stream(&query, Cursor::ZERO))
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(matched.len(), 2);
}

fn uuid_like() -> String {
    format!("w-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap())
}
