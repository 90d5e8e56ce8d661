//! Hosted backend error definitions.

use std::sync::Arc;
use thiserror::Error;

/// Errors raised while creating, writing to or closing the hosted client.
///
/// Cloneable so every caller of `close` can receive the same outcome.
#[derive(Debug, Clone, Error)]
pub enum CloudError {
    /// The client spawns its writer on the current Tokio runtime.
    #[error("no Tokio runtime available to run the logging client")]
    NoRuntime,

    /// Configured endpoint is not a valid base URL.
    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Transport failure talking to the API or metadata server.
    #[error("HTTP error: {0}")]
    Http(#[source] Arc<reqwest::Error>),

    /// The API answered with a non-success status.
    #[error("write rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    /// No access token could be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The client's writer is no longer running.
    #[error("logging client closed")]
    Closed,
}

impl From<reqwest::Error> for CloudError {
    fn from(e: reqwest::Error) -> Self {
        CloudError::Http(Arc::new(e))
    }
}

/// Result type for hosted backend operations.
pub type CloudResult<T> = Result<T, CloudError>;
