//! HTTP plumbing around request loggers.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing layer)
//!     → request.rs (assign X-Request-ID)
//!     → middleware/request_logger.rs (Logger per request, closed afterwards)
//!     → handler (logs through Extension<Arc<Logger>>)
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::request_logger_middleware;
pub use request::{
    propagate_request_id_layer, set_request_id_layer, RequestId, RequestIdExt, X_REQUEST_ID,
};
pub use server::HttpServer;
