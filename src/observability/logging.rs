//! Structured diagnostics for the crate itself.
//!
//! # Responsibilities
//! - Install the global tracing subscriber for binaries
//! - Honor `RUST_LOG`, falling back to a caller-supplied filter

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used by the bundled binary when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "request_logger=debug,tower_http=info";

/// Install a fmt subscriber writing to stderr.
///
/// Returns an error if a global subscriber is already set.
pub fn init_tracing(default_filter: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
