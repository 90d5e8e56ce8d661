//! Hosted structured-logging backend.
//!
//! # Data Flow
//! ```text
//! Logger (hosted variant)
//!     → EntrySink::log (non-blocking enqueue)
//!     → client.rs writer task (drain ready entries)
//!     → auth.rs (bearer token: static or metadata server)
//!     → POST {endpoint}/v2/entries:write
//! ```
//!
//! # Design Decisions
//! - The facade only sees the two traits below, so tests and embedders can
//!   swap in their own client
//! - Writes never block the caller; failures are reported once, at close
//! - No retry: a failed batch is dropped and logged through `tracing`

pub mod auth;
pub mod client;
pub mod resource;
pub mod types;

use futures_util::future::BoxFuture;
use std::sync::Arc;

use crate::logging::entry::Entry;

pub use client::CloudLoggingClient;
pub use resource::MonitoredResource;
pub use types::{CloudError, CloudResult};

/// A named log stream that accepts entries.
pub trait EntrySink: Send + Sync {
    /// Hand an entry to the backend. Must not block.
    fn log(&self, entry: Entry);
}

/// A connection to the hosted logging service.
pub trait HostedClient: Send + Sync {
    /// Stream for the log named `log_id` (e.g. `"request"`).
    fn logger(&self, log_id: &str) -> Arc<dyn EntrySink>;

    /// Flush pending entries and release the connection.
    ///
    /// Calling it again after it completed returns `Ok(())`.
    fn close(&self) -> BoxFuture<'_, CloudResult<()>>;
}
