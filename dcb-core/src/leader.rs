//! Cluster-wide mutual exclusion via a cluster lock (spec C9).
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Derives a stable numeric lock key from a lock name, so every process in
/// the cluster computes the same key for the same name.
pub fn hash_lock_name(name: &str) -> i64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish() as i64
}

/// Cluster-wide mutual exclusion, backed by a database-level session-scoped
/// lock in practice, so a crashed or killed instance releases automatically.
#[async_trait]
pub trait LeaderElector: Send + Sync {
    type Error: Send + Sync;

    /// Non-blocking attempt to become leader. Returns `true` iff this
    /// instance now holds the lock; an instance that already holds it
    /// returns `true` immediately without a new attempt.
    async fn try_acquire_leader(&self) -> Result<bool, Self::Error>;

    /// Fast local read of "do I hold the lock", no round-trip per call.
    fn is_leader(&self) -> bool;

    /// Releases the lock on shutdown.
    async fn release_leader(&self) -> Result<(), Self::Error>;

    /// A stable identifier for this process (hostname or configured).
    fn instance_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_hashes_the_same_name_to_the_same_key() {
        assert_eq!(hash_lock_name("wallet-processors"), hash_lock_name("wallet-processors"));
        assert_ne!(hash_lock_name("wallet-processors"), hash_lock_name("other"));
    }
}
