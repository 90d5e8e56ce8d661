//! Request Logger Middleware.
//! Gives every request its own logger and releases it afterwards.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, warn};

use crate::config::LoggerConfig;
use crate::logging::request::RequestContext;
use crate::logging::Logger;

/// Build a [`Logger`] bound to this request and expose it to handlers as
/// `Extension<Arc<Logger>>`.
///
/// The logger is closed once the response is produced. If the request
/// future is dropped first, dropping the logger stops the hosted writer
/// after it drains what was queued.
pub async fn request_logger_middleware(
    State(config): State<Arc<LoggerConfig>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let context = RequestContext::from_request(&req);

    let logger = match Logger::from_config(&config, Some(&context)) {
        Ok(logger) => Arc::new(logger),
        Err(e) => {
            error!(error = %e, path = %req.uri().path(), "Failed to create request logger");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Logging backend unavailable").into_response();
        }
    };

    req.extensions_mut().insert(logger.clone());
    let response = next.run(req).await;

    if let Err(e) = logger.close().await {
        warn!(
            error = %e,
            request_id = context.request_id.as_deref().unwrap_or("unknown"),
            "Failed to close request logger"
        );
    }

    response
}
