//! Tracing subscriber setup.
//!
//! The library only emits through `tracing` macros; installing a subscriber
//! is left to the application. These helpers cover the common cases and are
//! safe to call more than once: the first installed subscriber wins.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "cadence=info";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs a human-readable fmt subscriber driven by `RUST_LOG`.
///
/// Returns whether this call installed the subscriber.
pub fn init_tracing() -> bool {
    init_tracing_with(DEFAULT_FILTER)
}

/// Like [`init_tracing`], with an explicit fallback filter.
pub fn init_tracing_with(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Installs a JSON fmt subscriber driven by `RUST_LOG`.
///
/// Returns whether this call installed the subscriber.
pub fn init_json_tracing() -> bool {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(DEFAULT_FILTER))
        .with_current_span(true)
        .try_init()
        .is_ok()
}
