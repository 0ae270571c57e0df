//! PostgreSQL-backed `ProgressTracker`, storing one row per processor in
//! `processor_progress` (see `migrator/sql/table_processor_progress.sql`).
use async_trait::async_trait;
use sqlx::PgPool;

use crate::Error;
use dcb_core::progress::{ProcessorId, ProcessorStatus, ProgressTracker};

#[derive(Clone)]
pub struct PgProgressTracker {
    pool: PgPool,
}

impl PgProgressTracker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn status_to_sql(status: ProcessorStatus) -> &'static str {
    match status {
        ProcessorStatus::Active => "active",
        ProcessorStatus::Paused => "paused",
        ProcessorStatus::Failed => "failed",
    }
}

fn status_from_sql(value: &str) -> ProcessorStatus {
    match value {
        "paused" => ProcessorStatus::Paused,
        "failed" => ProcessorStatus::Failed,
        _ => ProcessorStatus::Active,
    }
}

#[async_trait]
impl ProgressTracker for PgProgressTracker {
    type Error = Error;

    async fn auto_register(&self, id: &ProcessorId, instance_id: &str) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO processor_progress (id, instance_id) VALUES ($1, $2)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(instance_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_last_position(&self, id: &ProcessorId) -> Result<i64, Error> {
        let position: Option<i64> =
            sqlx::query_scalar("SELECT last_position FROM processor_progress WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(position.unwrap_or(0))
    }

    async fn update_progress(&self, id: &ProcessorId, position: i64) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO processor_progress (id, last_position) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET
                 last_position = GREATEST(processor_progress.last_position, EXCLUDED.last_position),
                 updated_at = now()",
        )
        .bind(id)
        .bind(position)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_error(&self, id: &ProcessorId, message: &str, max_errors: u32) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO processor_progress (id, error_count, last_error, status)
             VALUES ($1, 1, $2, CASE WHEN 1 >= $3 THEN 'failed' ELSE 'active' END)
             ON CONFLICT (id) DO UPDATE SET
                 error_count = processor_progress.error_count + 1,
                 last_error = EXCLUDED.last_error,
                 status = CASE
                     WHEN processor_progress.error_count + 1 >= $3 THEN 'failed'
                     ELSE processor_progress.status
                 END,
                 updated_at = now()",
        )
        .bind(id)
        .bind(message)
        .bind(max_errors as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn reset_error_count(&self, id: &ProcessorId) -> Result<(), Error> {
        sqlx::query(
            "UPDATE processor_progress SET error_count = 0, status = 'active', last_error = NULL,
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_status(&self, id: &ProcessorId, status: ProcessorStatus) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO processor_progress (id, status) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET status = EXCLUDED.status, updated_at = now()",
        )
        .bind(id)
        .bind(status_to_sql(status))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_status(&self, id: &ProcessorId) -> Result<ProcessorStatus, Error> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM processor_progress WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(status.map(|s| status_from_sql(&s)).unwrap_or(ProcessorStatus::Active))
    }

    async fn get_lag(&self, id: &ProcessorId) -> Result<i64, Error> {
        let lag: i64 = sqlx::query_scalar(
            "SELECT GREATEST(
                 (SELECT COALESCE(MAX(position), 0) FROM events),
                 0
             ) - COALESCE(
                 (SELECT last_position FROM processor_progress WHERE id = $1), 0
             )",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(lag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_round_trips_status_through_sql_strings() {
        for status in [ProcessorStatus::Active, ProcessorStatus::Paused, ProcessorStatus::Failed] {
            assert_eq!(status_from_sql(status_to_sql(status)), status);
        }
    }

    #[test]
    fn unknown_status_strings_default_to_active() {
        assert_eq!(status_from_sql("bogus"), ProcessorStatus::Active);
    }
}
