//! Observability
//!
//! Structured logging goes through `tracing`. This module provides:
//! - Subscriber setup for the binary (`RUST_LOG`, default `info`, to stderr)
//! - Pipeline lifecycle events
//! - Scope-based begin/complete logging for pipeline phases

mod events;
mod scope;

pub use events::Event;
pub use scope::ObservationScope;

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global fmt subscriber.
///
/// Logs go to stderr so stdout stays a clean JSON response channel. Calling
/// this more than once is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
