//! Event handler dispatch (spec C12): routes a processor's fetched batch to
//! its registered handler.
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use dcb_core::event::PersistedEvent;
use dcb_core::handler::{EventHandler, HandlerError};
use dcb_core::progress::ProcessorId;

/// Maps each processor id to the handler that processes its batches.
#[derive(Default)]
pub struct HandlerRegistry<E> {
    handlers: HashMap<ProcessorId, Arc<dyn EventHandler<E>>>,
}

impl<E> HandlerRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, id: impl Into<ProcessorId>, handler: Arc<dyn EventHandler<E>>) -> Self {
        self.handlers.insert(id.into(), handler);
        self
    }

    pub fn get(&self, id: &ProcessorId) -> Option<&Arc<dyn EventHandler<E>>> {
        self.handlers.get(id)
    }
}

/// Applies a caller-supplied async closure to each event in a batch, e.g. an
/// `UPDATE`/`INSERT` against a materialized view table.
pub struct ViewUpdaterHandler<E, F> {
    update: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F, Fut> ViewUpdaterHandler<E, F>
where
    F: Fn(&PersistedEvent<E>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
    E: dcb_core::Event,
{
    pub fn new(update: F) -> Self {
        Self { update, _event: PhantomData }
    }
}

#[async_trait]
impl<E, F, Fut> EventHandler<E> for ViewUpdaterHandler<E, F>
where
    E: dcb_core::Event + Send + Sync,
    F: Fn(&PersistedEvent<E>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    async fn handle(&self, batch: &[PersistedEvent<E>]) -> Result<usize, HandlerError> {
        for event in batch {
            (self.update)(event).await?;
        }
        Ok(batch.len())
    }
}

/// A smoke-test/default handler that logs batch counts via `tracing`.
#[derive(Default)]
pub struct LoggingHandler;

#[async_trait]
impl<E> EventHandler<E> for LoggingHandler
where
    E: Send + Sync,
{
    async fn handle(&self, batch: &[PersistedEvent<E>]) -> Result<usize, HandlerError> {
        info!(count = batch.len(), "handled batch");
        Ok(batch.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopEvent;

    impl dcb_core::Event for NoopEvent {
        fn event_type(&self) -> &'static str {
            "Noop"
        }
        fn tags(&self) -> dcb_core::TagSet {
            dcb_core::TagSet::new()
        }
    }

    #[tokio::test]
    async fn logging_handler_reports_the_batch_length() {
        let handler = LoggingHandler;
        let batch: Vec<PersistedEvent<NoopEvent>> = Vec::new();
        assert_eq!(handler.handle(&batch).await.unwrap(), 0);
    }

    #[test]
    fn registry_returns_none_for_unregistered_processors() {
        let registry: HandlerRegistry<NoopEvent> = HandlerRegistry::new();
        assert!(registry.get(&"missing".to_string()).is_none());
    }
}
