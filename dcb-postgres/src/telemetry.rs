//! Optional `tracing_subscriber` initializer for binaries/tests. The library
//! itself only emits `tracing` events; it never installs a subscriber.
use tracing_subscriber::EnvFilter;

/// Installs a `tracing_subscriber::fmt` subscriber driven by `RUST_LOG`
/// (defaulting to `info`). Safe to call more than once; later calls are
/// no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
