//! Request logger demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ TraceLayer ─▶ SetRequestId ─▶ PropagateRequestId ─▶ request_logger ─▶ handler
//!                                                         │               │
//!                                                         │ Logger::from_config
//!                                                         ▼               ▼
//!                                        GOOGLE_CLOUD_PROJECT set?   infof!/errorf!
//!                                           yes ─▶ Cloud Logging (entries:write)
//!                                           no  ─▶ stderr lines
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::net::TcpListener;

use request_logger::config::{load_config, LoggerConfig};
use request_logger::http::HttpServer;
use request_logger::observability::logging::{init_tracing, DEFAULT_FILTER};
use request_logger::{noticef, Logger};

#[derive(Parser)]
#[command(name = "request-logger")]
#[command(about = "Demo HTTP server logging each request to Cloud Logging or stderr", long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing(DEFAULT_FILTER) {
        eprintln!("failed to initialize tracing: {}", e);
    }

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LoggerConfig::from_env(),
    };

    tracing::info!(
        project_id = config.hosted_project().unwrap_or("-"),
        log_id = %config.log_id,
        "Configuration loaded"
    );

    // A hosted backend that cannot be built is a startup error.
    let startup = Logger::from_config(&config, None)?;
    noticef!(startup, "request-logger v{} starting on {}", env!("CARGO_PKG_VERSION"), cli.bind);
    startup.close().await?;

    let listener = TcpListener::bind(&cli.bind).await?;
    HttpServer::new(config).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
