//! Processor scheduler (spec C11): the outbox runtime.
//!
//! Owns one polling task per registered processor plus a leader-retry task,
//! grounded on `PgEventListener`'s `spawn_task`/`tokio::select!` shutdown
//! shape. Each tick checks leadership, pause/backoff state, fetches a batch
//! via `PgEventFetcher`, hands it to the processor's `EventHandler`, and
//! checkpoints only after the handler returns successfully — a crash between
//! handling and checkpointing redelivers the same batch on the next tick.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use dcb_core::backoff::BackoffController;
use dcb_core::event::{Cursor, Event};
use dcb_core::handler::EventHandler;
use dcb_core::leader::LeaderElector;
use dcb_core::progress::{ProcessorId, ProcessorStatus, ProgressTracker};

use crate::config::ProcessorConfig;
use crate::error::is_shutdown_connection_error;
use crate::event_store::PgEventStore;
use crate::fetcher::PgEventFetcher;
use crate::Error;
use dcb_serde::Serde;

#[cfg(test)]
mod tests;

struct ProcessorHandle {
    config: ProcessorConfig,
    backoff: Mutex<BackoffController>,
}

/// Owns the set of registered processors and runs their tick loops.
///
/// Registration happens once at startup, not on the per-tick hot path, so a
/// plain `Mutex<HashMap<..>>` over the processor map is sufficient.
pub struct Runtime<E, S>
where
    S: Serde<E> + Send + Sync,
{
    store: Arc<PgEventStore<E, S>>,
    progress: Arc<dyn ProgressTracker<Error = Error>>,
    leader: Arc<dyn LeaderElector<Error = Error>>,
    handlers: HashMap<ProcessorId, Arc<dyn EventHandler<E>>>,
    processors: Mutex<HashMap<ProcessorId, Arc<ProcessorHandle>>>,
    shutdown: CancellationToken,
}

impl<E, S> Runtime<E, S>
where
    E: Event + Send + Sync + 'static,
    S: Serde<E> + Send + Sync + Clone + 'static,
{
    pub fn new(
        store: Arc<PgEventStore<E, S>>,
        progress: Arc<dyn ProgressTracker<Error = Error>>,
        leader: Arc<dyn LeaderElector<Error = Error>>,
    ) -> Self {
        Self {
            store,
            progress,
            leader,
            handlers: HashMap::new(),
            processors: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn register(mut self, config: ProcessorConfig, handler: Arc<dyn EventHandler<E>>) -> Self {
        self.handlers.insert(config.id.clone(), handler);
        self.processors.lock().unwrap().insert(
            config.id.clone(),
            Arc::new(ProcessorHandle {
                config,
                backoff: Mutex::new(BackoffController::new()),
            }),
        );
        self
    }

    /// Spawns one tick task per registered processor plus the leader-retry
    /// task. Drop the returned handles or call `shutdown_token().cancel()` to
    /// stop them.
    pub fn spawn(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        let ids: Vec<ProcessorId> = self.processors.lock().unwrap().keys().cloned().collect();
        let mut handles: Vec<JoinHandle<()>> =
            ids.into_iter().map(|id| self.clone().spawn_processor(id)).collect();
        handles.push(self.clone().spawn_leader_retry());
        handles
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn pause(&self, id: &ProcessorId) -> Result<(), Error> {
        self.progress.set_status(id, ProcessorStatus::Paused).await
    }

    pub async fn resume(&self, id: &ProcessorId) -> Result<(), Error> {
        self.progress.reset_error_count(id).await
    }

    pub async fn status(&self, id: &ProcessorId) -> Result<ProcessorStatus, Error> {
        self.progress.get_status(id).await
    }

    pub async fn lag(&self, id: &ProcessorId) -> Result<i64, Error> {
        self.progress.get_lag(id).await
    }

    pub fn list_processors(&self) -> Vec<ProcessorId> {
        self.processors.lock().unwrap().keys().cloned().collect()
    }

    fn spawn_leader_retry(self: Arc<Self>) -> JoinHandle<()> {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(5));
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match self.leader.try_acquire_leader().await {
                            Ok(true) => info!("holding leader lock"),
                            Ok(false) => {}
                            Err(err) => error!(%err, "leader election attempt failed"),
                        }
                    }
                    _ = shutdown.cancelled() => return,
                }
            }
        })
    }

    fn spawn_processor(self: Arc<Self>, id: ProcessorId) -> JoinHandle<()> {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let handle = {
                let processors = self.processors.lock().unwrap();
                match processors.get(&id) {
                    Some(handle) => handle.clone(),
                    None => return,
                }
            };

            let mut interval = tokio::time::interval(handle.config.poll_interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if shutdown.is_cancelled() {
                            return;
                        }
                        self.tick(&id, &handle).await;
                    }
                    _ = shutdown.cancelled() => return,
                }
            }
        })
    }

    async fn tick(&self, id: &ProcessorId, handle: &ProcessorHandle) {
        if !handle.config.enabled || !self.leader.is_leader() {
            return;
        }

        if let Err(err) = self.progress.auto_register(id, self.leader.instance_id()).await {
            return self.log_tick_error(&err);
        }

        let status = match self.progress.get_status(id).await {
            Ok(status) => status,
            Err(err) => return self.log_tick_error(&err),
        };
        if status != ProcessorStatus::Active {
            return;
        }

        if handle.config.backoff_enabled && handle.backoff.lock().unwrap().should_skip() {
            return;
        }

        let last_position = match self.progress.get_last_position(id).await {
            Ok(position) => position,
            Err(err) => return self.log_tick_error(&err),
        };
        let after = Cursor::new(last_position, chrono::DateTime::<chrono::Utc>::MIN_UTC, 0);

        let fetcher = PgEventFetcher::new(&self.store);
        let batch = match fetcher
            .fetch_events(&handle.config.subscription, after, handle.config.batch_size)
            .await
        {
            Ok(batch) => batch,
            Err(err) => return self.log_tick_error(&err),
        };

        if batch.is_empty() {
            if handle.config.backoff_enabled {
                handle.backoff.lock().unwrap().record_empty(&handle.config.backoff);
            }
            return;
        }
        if handle.config.backoff_enabled {
            handle.backoff.lock().unwrap().record_success();
        }

        let Some(handler) = self.handlers.get(id) else {
            return;
        };
        let last_fetched = batch.last().expect("checked non-empty above").position();

        match handler.handle(&batch).await {
            Ok(_) => {
                if let Err(err) = self.progress.update_progress(id, last_fetched).await {
                    return self.log_tick_error(&err);
                }
                let _ = self.progress.reset_error_count(id).await;
            }
            Err(handler_err) => {
                let _ = self
                    .progress
                    .record_error(id, &handler_err.to_string(), handle.config.max_errors)
                    .await;
            }
        }
    }

    fn log_tick_error(&self, err: &Error) {
        if is_shutdown_connection_error(err) {
            debug!(%err, "connection error during shutdown, ignoring");
        } else {
            error!(%err, "processor tick failed");
        }
    }
}
