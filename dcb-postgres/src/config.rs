//! Processor & runtime configuration (spec §6).
//!
//! Most callers build `ProcessorConfig` directly in code; `from_env` is an
//! opt-in convenience path for per-processor overrides supplied through the
//! environment, loaded via `dotenvy` in binaries that call `dotenvy::dotenv()`
//! before constructing their configs.
use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

use dcb_core::backoff::BackoffConfig;
use dcb_core::progress::ProcessorId;
use dcb_core::subscription::Subscription;

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub id: ProcessorId,
    pub enabled: bool,
    pub polling_interval_ms: u64,
    pub batch_size: usize,
    pub max_errors: u32,
    pub backoff_enabled: bool,
    pub backoff: BackoffConfig,
    pub subscription: Subscription,
}

impl ProcessorConfig {
    pub fn new(id: impl Into<ProcessorId>, subscription: Subscription) -> Self {
        let polling_interval_ms = 1000;
        Self {
            id: id.into(),
            enabled: true,
            polling_interval_ms,
            batch_size: 100,
            max_errors: 5,
            backoff_enabled: true,
            backoff: BackoffConfig {
                threshold: 3,
                multiplier: 2,
                polling_interval_ms,
                max_backoff_seconds: 60,
            },
            subscription,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }

    /// Applies overrides from environment variables prefixed with the
    /// processor id in upper-snake form, e.g. for id `wallet-view`:
    /// `WALLET_VIEW_ENABLED`, `WALLET_VIEW_POLLING_INTERVAL_MS`,
    /// `WALLET_VIEW_BATCH_SIZE`, `WALLET_VIEW_MAX_ERRORS`,
    /// `WALLET_VIEW_BACKOFF_ENABLED`.
    pub fn from_env(id: impl Into<ProcessorId>, subscription: Subscription) -> Self {
        let id = id.into();
        let mut config = Self::new(id.clone(), subscription);
        let prefix = env_prefix(&id);

        if let Some(value) = env_bool(&format!("{prefix}_ENABLED")) {
            config.enabled = value;
        }
        if let Some(value) = env_u64(&format!("{prefix}_POLLING_INTERVAL_MS")) {
            config.polling_interval_ms = value;
            config.backoff.polling_interval_ms = value;
        }
        if let Some(value) = env_u64(&format!("{prefix}_BATCH_SIZE")) {
            config.batch_size = value as usize;
        }
        if let Some(value) = env_u64(&format!("{prefix}_MAX_ERRORS")) {
            config.max_errors = value as u32;
        }
        if let Some(value) = env_bool(&format!("{prefix}_BACKOFF_ENABLED")) {
            config.backoff_enabled = value;
        }
        config
    }
}

/// Resolves this process's instance id: the `HOSTNAME` env var, then
/// `configured`, then the OS hostname.
pub fn resolve_instance_id(configured: Option<&str>) -> String {
    if let Ok(hostname) = env::var("HOSTNAME") {
        return hostname;
    }
    if let Some(configured) = configured {
        return configured.to_string();
    }
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown-instance".to_string())
}

/// Parses a comma-separated environment value into a set of trimmed,
/// non-empty strings.
pub fn parse_csv_set(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_prefix(id: &str) -> String {
    id.to_uppercase().replace(['-', '.'], "_")
}

fn env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
