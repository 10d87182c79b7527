//! Tracing bootstrap for binaries and integration tests.
//!
//! Library code only emits events via the `tracing` macros; subscribing is
//! the host's decision. `RUST_LOG` controls the filter.

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber. Safe to call more than once; later
/// calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
    {
        ::tracing::debug!("tracing initialized");
    }
}
