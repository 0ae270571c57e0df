//! PostgreSQL-backed `LeaderElector` using a session-scoped advisory lock.
//!
//! Grounded on the dedicated-connection advisory-lock pattern used for
//! migration locking elsewhere in the pack (`pg_advisory_lock` held on one
//! checked-out connection, released automatically if that connection
//! drops): here we use the non-blocking `pg_try_advisory_lock` variant so a
//! processor retries instead of blocking.
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::Error;
use dcb_core::leader::{hash_lock_name, LeaderElector};

/// Holds one pooled connection for the lifetime of the lock attempt; the
/// session-scoped lock it acquires is released when that connection is
/// dropped or returned to the pool, which covers crash/kill scenarios.
pub struct PgLeaderElector {
    pool: PgPool,
    lock_key: i64,
    instance_id: String,
    connection: Mutex<Option<PoolConnection<Postgres>>>,
    holding: AtomicBool,
}

impl PgLeaderElector {
    pub fn new(pool: PgPool, lock_name: &str, instance_id: impl Into<String>) -> Self {
        Self {
            pool,
            lock_key: hash_lock_name(lock_name),
            instance_id: instance_id.into(),
            connection: Mutex::new(None),
            holding: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl LeaderElector for PgLeaderElector {
    type Error = Error;

    async fn try_acquire_leader(&self) -> Result<bool, Error> {
        if self.holding.load(Ordering::Acquire) {
            return Ok(true);
        }

        let mut guard = self.connection.lock().await;
        let conn = match guard.as_mut() {
            Some(conn) => conn,
            None => {
                *guard = Some(self.pool.acquire().await?);
                guard.as_mut().unwrap()
            }
        };

        let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
            .bind(self.lock_key)
            .fetch_one(&mut **conn)
            .await?;

        if acquired {
            self.holding.store(true, Ordering::Release);
        } else {
            *guard = None;
        }
        Ok(acquired)
    }

    fn is_leader(&self) -> bool {
        self.holding.load(Ordering::Acquire)
    }

    async fn release_leader(&self) -> Result<(), Error> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_mut() {
            sqlx::query("SELECT pg_advisory_unlock($1)")
                .bind(self.lock_key)
                .execute(&mut **conn)
                .await?;
        }
        *guard = None;
        self.holding.store(false, Ordering::Release);
        Ok(())
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_derives_the_lock_key_from_the_name_at_construction() {
        assert_eq!(hash_lock_name("wallet-processors"), hash_lock_name("wallet-processors"));
    }
}
