//! PostgreSQL-backed DCB event store and processor runtime.
//!
//! `PgEventStore` implements `dcb_core::EventStore`: append-if-unconflicted
//! writes and tag-filtered streaming reads over a single `events` table.
//! `Runtime` builds an at-least-once processor pool on top of it — leader
//! election, progress checkpointing, backoff, and dispatch to
//! application-supplied `EventHandler`s.
pub mod config;
pub mod dispatch;
mod error;
mod event_store;
pub mod fetcher;
pub mod leader;
mod migrator;
pub mod progress;
pub mod scheduler;
pub mod telemetry;

pub use config::ProcessorConfig;
pub use dispatch::{HandlerRegistry, LoggingHandler, ViewUpdaterHandler};
pub use error::{is_shutdown_connection_error, Error};
pub use event_store::PgEventStore;
pub use fetcher::PgEventFetcher;
pub use leader::PgLeaderElector;
pub use migrator::Migrator;
pub use progress::PgProgressTracker;
pub use scheduler::Runtime;
