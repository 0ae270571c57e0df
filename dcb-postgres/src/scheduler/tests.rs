//! Live-database scheduler tests. Require `DATABASE_URL`; run with
//! `cargo test -- --ignored`.
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use dcb_core::event::PersistedEvent;
use dcb_core::handler::{EventHandler, HandlerError};
use dcb_core::progress::ProcessorStatus;
use dcb_core::subscription::Subscription;
use dcb_core::{tags, Event, ProgressTracker, TagSet};
use dcb_serde::serde::json::Json;

use super::Runtime;
use crate::config::ProcessorConfig;
use crate::event_store::PgEventStore;
use crate::leader::PgLeaderElector;
use crate::migrator::Migrator;
use crate::progress::PgProgressTracker;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum WalletEvent {
    Opened { wallet_id: String },
}

impl Event for WalletEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WalletEvent::Opened { .. } => "Opened",
        }
    }

    fn tags(&self) -> TagSet {
        match self {
            WalletEvent::Opened { wallet_id } => tags! { wallet_id: wallet_id.clone() },
        }
    }
}

struct FlakyHandler {
    attempts: AtomicUsize,
}

#[async_trait]
impl EventHandler<WalletEvent> for FlakyHandler {
    async fn handle(&self, batch: &[PersistedEvent<WalletEvent>]) -> Result<usize, HandlerError> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(HandlerError::new("simulated crash before checkpoint"));
        }
        Ok(batch.len())
    }
}

async fn pool() -> PgPool {
    let url = env::var("DATABASE_URL").expect("DATABASE_URL must be set for live-db tests");
    let pool = PgPool::connect(&url).await.unwrap();
    Migrator::new(pool.clone()).run().await.unwrap();
    pool
}

/// Scenario S6: a handler failure on the first attempt must not advance
/// progress; the same batch is redelivered and succeeds on retry.
#[tokio::test]
#[ignore]
async fn it_redelivers_a_batch_after_a_failed_handle() {
    let pool = pool().await;
    let store = Arc::new(PgEventStore::new_uninitialized(pool.clone(), Json::<WalletEvent>::default()));
    let progress: Arc<dyn ProgressTracker<Error = crate::Error>> =
        Arc::new(PgProgressTracker::new(pool.clone()));
    let leader: Arc<dyn dcb_core::LeaderElector<Error = crate::Error>> =
        Arc::new(PgLeaderElector::new(pool.clone(), "scheduler-test-s6", "test-instance"));
    leader.try_acquire_leader().await.unwrap();

    let handler = Arc::new(FlakyHandler { attempts: AtomicUsize::new(0) });
    let config = ProcessorConfig::new("wallet-view-s6", Subscription::new().with_event_types(["Opened"]));
    let id = config.id.clone();

    let runtime = Arc::new(
        Runtime::new(store.clone(), progress.clone(), leader.clone())
            .register(config, handler.clone()),
    );

    use dcb_core::event_store::{AppendCondition, EventStore};
    store
        .append_if(vec![WalletEvent::Opened { wallet_id: "w1".into() }], AppendCondition::none())
        .await
        .unwrap();

    let handle = {
        let processors = runtime.processors.lock().unwrap();
        processors.get(&id).unwrap().clone()
    };
    progress.auto_register(&id, "test-instance").await.unwrap();

    runtime.tick(&id, &handle).await;
    assert_eq!(progress.get_last_position(&id).await.unwrap(), 0, "failed handle must not checkpoint");

    runtime.tick(&id, &handle).await;
    assert!(progress.get_last_position(&id).await.unwrap() > 0, "retry must checkpoint on success");

    assert_eq!(handler.attempts.load(Ordering::SeqCst), 2);
}

/// Scenario S4: pausing a processor stops it from ticking until resumed.
#[tokio::test]
#[ignore]
async fn it_skips_ticks_while_paused() {
    let pool = pool().await;
    let store = Arc::new(PgEventStore::new_uninitialized(pool.clone(), Json::<WalletEvent>::default()));
    let progress: Arc<dyn ProgressTracker<Error = crate::Error>> =
        Arc::new(PgProgressTracker::new(pool.clone()));
    let leader: Arc<dyn dcb_core::LeaderElector<Error = crate::Error>> =
        Arc::new(PgLeaderElector::new(pool.clone(), "scheduler-test-s4", "test-instance"));
    leader.try_acquire_leader().await.unwrap();

    let handler = Arc::new(FlakyHandler { attempts: AtomicUsize::new(1) });
    let config = ProcessorConfig::new("wallet-view-s4", Subscription::new().with_event_types(["Opened"]));
    let id = config.id.clone();

    let runtime = Arc::new(
        Runtime::new(store.clone(), progress.clone(), leader.clone())
            .register(config, handler.clone()),
    );

    use dcb_core::event_store::{AppendCondition, EventStore};
    store
        .append_if(vec![WalletEvent::Opened { wallet_id: "w2".into() }], AppendCondition::none())
        .await
        .unwrap();

    progress.auto_register(&id, "test-instance").await.unwrap();
    runtime.pause(&id).await.unwrap();
    assert_eq!(progress.get_status(&id).await.unwrap(), ProcessorStatus::Paused);

    let handle = {
        let processors = runtime.processors.lock().unwrap();
        processors.get(&id).unwrap().clone()
    };
    runtime.tick(&id, &handle).await;
    assert_eq!(progress.get_last_position(&id).await.unwrap(), 0, "a paused processor must not advance");

    runtime.resume(&id).await.unwrap();
    assert_eq!(progress.get_status(&id).await.unwrap(), ProcessorStatus::Active);
    runtime.tick(&id, &handle).await;
    assert!(progress.get_last_position(&id).await.unwrap() > 0, "resumed processor ticks normally");

    tokio::time::sleep(Duration::from_millis(1)).await;
}
