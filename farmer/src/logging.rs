//! Diagnostic tracing for setup runs.
//!
//! Spans and events record which command ran, its exit code and why a step
//! stopped. They go to stderr and are silent below `warn` unless `RUST_LOG`
//! asks for more. What the operator follows during a run (step banners and
//! the child's streamed output) is written by [`crate::io::console`] to
//! stdout, and no filter setting changes it.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default directive when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Call once, before the first step.
///
/// `RUST_LOG=farmer=debug farmer` shows every spawn, exit code and planned
/// step alongside the normal console output.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();
}
