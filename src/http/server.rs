//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the demo handlers
//! - Wire up middleware (tracing, request ID, request logger)
//! - Bind server to listener and shut down on Ctrl+C

use axum::{
    extract::Extension,
    http::{Method, StatusCode, Uri},
    middleware,
    response::IntoResponse,
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::LoggerConfig;
use crate::http::middleware::request_logger_middleware;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::logging::Logger;
use crate::{errorf, infof, warningf};

/// Demo server whose handlers log through per-request loggers.
pub struct HttpServer {
    router: Router,
    config: Arc<LoggerConfig>,
}

impl HttpServer {
    pub fn new(config: LoggerConfig) -> Self {
        let config = Arc::new(config);
        let router = build_router(config.clone());
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            hosted = self.config.hosted_project().is_some(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(config: Arc<LoggerConfig>) -> Router {
    Router::new()
        .route("/", any(echo_handler))
        .route("/{*path}", any(echo_handler))
        .layer(middleware::from_fn_with_state(config, request_logger_middleware))
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
        .layer(TraceLayer::new_for_http())
}

/// Echo the request line. `/fail` answers 500 to show error entries.
async fn echo_handler(
    Extension(logger): Extension<Arc<Logger>>,
    method: Method,
    uri: Uri,
) -> impl IntoResponse {
    infof!(logger, "{} {}", method, uri.path());

    match uri.path() {
        "/fail" => {
            errorf!(logger, "simulated failure for {}", uri);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed\n".to_string())
        }
        path if path.len() > 1024 => {
            warningf!(logger, "path of {} bytes", path.len());
            (StatusCode::URI_TOO_LONG, "path too long\n".to_string())
        }
        path => (StatusCode::OK, format!("{} {}\n", method, path)),
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
