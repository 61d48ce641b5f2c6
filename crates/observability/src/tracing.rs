//! Tracing/logging initialization.
//!
//! Permission decisions are the interesting signal here: fail-closed
//! fallbacks log at `warn`, cache/flight transitions at `debug`. Raise the
//! filter with e.g. `RUST_LOG=balcao_authz=debug` when chasing a stale-cache
//! report.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}
