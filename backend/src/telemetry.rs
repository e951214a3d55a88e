//! Tracing setup for the CLI.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the binary or to the embedding application.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LEVEL: &str = "info";

/// Install a compact `fmt` subscriber writing to stderr.
///
/// The filter comes from `RUST_LOG`, falling back to `default_level`.
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(default_level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .is_ok()
}
