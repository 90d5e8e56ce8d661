//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Library internals (client creation, failed writes, close)
//!     → tracing events
//!     → logging.rs subscriber (EnvFilter + fmt, stderr)
//! ```
//!
//! # Design Decisions
//! - The crate's own diagnostics go through `tracing`, never through a
//!   request `Logger`, so a failing backend cannot recurse into itself
//! - Installing a subscriber is left to binaries

pub mod logging;

pub use logging::init_tracing;
