//! Database initialization for the event store and processor runtime.
//!
//! Unlike the teacher's column-per-domain-identifier schema, this store's
//! `tags` column needs no per-event-type DDL, so `Migrator` no longer takes
//! an `Event` type parameter: the same fixed set of tables/sequences/indexes
//! is created regardless of the application's event family.
use sqlx::PgPool;

use crate::Error;

/// Applies the embedded schema to `pool`. Every statement is `CREATE ... IF
/// NOT EXISTS`, so `run` is idempotent and safe to call on every startup.
pub struct Migrator {
    pool: PgPool,
}

impl Migrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `events`, `commands`, and `processor_progress` tables,
    /// their sequences, and the indexes the criteria builder and progress
    /// tracker rely on.
    pub async fn run(&self) -> Result<(), Error> {
        for sql in [
            include_str!("migrator/sql/seq_events_position.sql"),
            include_str!("migrator/sql/seq_events_tx_id.sql"),
            include_str!("migrator/sql/table_events.sql"),
            include_str!("migrator/sql/idx_events_type.sql"),
            include_str!("migrator/sql/idx_events_tags_gin.sql"),
            include_str!("migrator/sql/table_commands.sql"),
            include_str!("migrator/sql/table_processor_progress.sql"),
        ] {
            sqlx::query(sql).execute(&self.pool).await?;
        }
        Ok(())
    }
}
