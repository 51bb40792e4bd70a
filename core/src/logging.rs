//! Structured logging setup.
//!
//! Every subsystem logs through `tracing`; this module is the single
//! place that installs a subscriber, so a host only ever calls
//! [`init`] once at startup.

use tracing_subscriber::EnvFilter;

/// Default filter directive when `TERMANIA_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Install a `fmt` subscriber with an `EnvFilter` seeded from
/// `TERMANIA_LOG`, falling back to `filter` (itself falling back to
/// `"info"` if empty). Safe to call more than once; later calls are a
/// no-op since `tracing`'s global default can only be set once per
/// process.
pub fn init(filter: &str) {
    let directive = if filter.is_empty() {
        DEFAULT_FILTER
    } else {
        filter
    };
    let env_filter = EnvFilter::try_from_env("TERMANIA_LOG")
        .unwrap_or_else(|_| EnvFilter::new(directive.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
