//! Request-scoped severity logger.
//!
//! Sends printf-style messages at nine severities either to Google Cloud
//! Logging (when `GOOGLE_CLOUD_PROJECT` is set) or to standard error.

pub mod cloud;
pub mod config;
pub mod http;
pub mod logging;
pub mod observability;
pub mod severity;

pub use config::LoggerConfig;
pub use logging::request::RequestContext;
pub use logging::Logger;
pub use severity::Severity;
