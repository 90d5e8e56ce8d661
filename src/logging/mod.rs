//! Request-scoped severity logger.
//!
//! # Data Flow
//! ```text
//! caller
//!     → Logger::<severity>() (#[track_caller] captures the call site)
//!     → Logger::log_at
//!         → Hosted: entry.rs builds Entry → EntrySink::log (non-blocking)
//!         → Local:  local.rs writes one line to stderr
//! ```
//!
//! # Design Decisions
//! - The backend is chosen once, when the logger is built, and never changes
//! - Construction errors are returned; the host decides whether to abort
//! - One logger per request; `close` releases the hosted client

pub mod entry;
pub mod local;
pub mod request;

mod macros;

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use axum::http::Request;

use crate::cloud::{CloudLoggingClient, CloudResult, EntrySink, HostedClient};
use crate::config::LoggerConfig;
use crate::severity::Severity;

use entry::{format_payload, CallSite, Entry, SourceLocation};
use local::LineLogger;
use request::RequestContext;

/// Where a logger sends its output.
enum Backend {
    /// Hosted service; the stream is always derived from this client.
    Hosted {
        client: Arc<dyn HostedClient>,
        stream: Arc<dyn EntrySink>,
        project_id: String,
        request: Option<RequestContext>,
    },
    /// Standard error (or an injected writer).
    Local(Arc<LineLogger>),
}

/// Severity-leveled logger bound to at most one request.
pub struct Logger {
    backend: Backend,
}

impl Logger {
    /// Build a logger from the process environment.
    ///
    /// Uses the hosted backend when `GOOGLE_CLOUD_PROJECT` is set and
    /// non-empty, stderr otherwise.
    pub fn new(request: Option<&RequestContext>) -> CloudResult<Self> {
        Self::from_config(&LoggerConfig::from_env(), request)
    }

    /// Build a logger bound to an inbound HTTP request.
    pub fn for_request<B>(request: &Request<B>) -> CloudResult<Self> {
        Self::new(Some(&RequestContext::from_request(request)))
    }

    /// Build a logger from explicit configuration.
    ///
    /// Without a hosted project no client is created and this cannot fail.
    pub fn from_config(config: &LoggerConfig, request: Option<&RequestContext>) -> CloudResult<Self> {
        match config.hosted_project() {
            Some(project_id) => {
                let client = CloudLoggingClient::new(&config.cloud, project_id)?;
                Ok(Self::hosted(Arc::new(client), project_id, &config.log_id, request))
            }
            None => Ok(Self::local(Arc::new(LineLogger::stderr(config.local)))),
        }
    }

    /// Logger over an existing hosted client; derives the `log_id` stream.
    pub fn hosted(
        client: Arc<dyn HostedClient>,
        project_id: &str,
        log_id: &str,
        request: Option<&RequestContext>,
    ) -> Self {
        let stream = client.logger(log_id);
        Self {
            backend: Backend::Hosted {
                client,
                stream,
                project_id: project_id.to_string(),
                request: request.cloned(),
            },
        }
    }

    /// Logger writing lines through `line_logger`.
    pub fn local(line_logger: Arc<LineLogger>) -> Self {
        Self {
            backend: Backend::Local(line_logger),
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self.backend, Backend::Hosted { .. })
    }

    pub fn project_id(&self) -> Option<&str> {
        match &self.backend {
            Backend::Hosted { project_id, .. } => Some(project_id),
            Backend::Local(_) => None,
        }
    }

    /// Emit one entry or line at `severity`.
    ///
    /// `location` is the call site; `None` is recorded as `???:0`.
    pub fn log_at(
        &self,
        severity: Severity,
        location: Option<&'static Location<'static>>,
        args: fmt::Arguments<'_>,
    ) {
        let site = CallSite::from_location(location);
        match &self.backend {
            Backend::Hosted {
                stream,
                project_id,
                request,
                ..
            } => {
                let mut entry = Entry::new(severity, format_payload(&site, args));
                entry.source_location = (!site.is_unknown()).then(|| SourceLocation {
                    file: site.file.to_string(),
                    line: site.line,
                });
                if let Some(request) = request {
                    correlate(&mut entry, project_id, request);
                }
                stream.log(entry);
            }
            Backend::Local(line_logger) => line_logger.output(severity, &site, args),
        }
    }

    #[track_caller]
    pub fn default(&self, args: fmt::Arguments<'_>) {
        self.log_at(Severity::Default, Some(Location::caller()), args);
    }

    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log_at(Severity::Debug, Some(Location::caller()), args);
    }

    #[track_caller]
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log_at(Severity::Info, Some(Location::caller()), args);
    }

    #[track_caller]
    pub fn notice(&self, args: fmt::Arguments<'_>) {
        self.log_at(Severity::Notice, Some(Location::caller()), args);
    }

    #[track_caller]
    pub fn warning(&self, args: fmt::Arguments<'_>) {
        self.log_at(Severity::Warning, Some(Location::caller()), args);
    }

    #[track_caller]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log_at(Severity::Error, Some(Location::caller()), args);
    }

    #[track_caller]
    pub fn critical(&self, args: fmt::Arguments<'_>) {
        self.log_at(Severity::Critical, Some(Location::caller()), args);
    }

    #[track_caller]
    pub fn alert(&self, args: fmt::Arguments<'_>) {
        self.log_at(Severity::Alert, Some(Location::caller()), args);
    }

    #[track_caller]
    pub fn emergency(&self, args: fmt::Arguments<'_>) {
        self.log_at(Severity::Emergency, Some(Location::caller()), args);
    }

    /// Like the named severity methods, with the level chosen at runtime.
    #[track_caller]
    pub fn log(&self, severity: Severity, args: fmt::Arguments<'_>) {
        self.log_at(severity, Some(Location::caller()), args);
    }

    /// Release the hosted client, flushing what it still holds.
    ///
    /// Local loggers have nothing to release and always succeed. Errors are
    /// not retried.
    pub async fn close(&self) -> CloudResult<()> {
        match &self.backend {
            Backend::Hosted { client, .. } => client.close().await,
            Backend::Local(_) => Ok(()),
        }
    }
}

/// Attach request details and trace ids so entries group by request.
fn correlate(entry: &mut Entry, project_id: &str, request: &RequestContext) {
    entry.http_request = Some(request.http_request.clone());
    if let Some(trace) = &request.trace {
        entry.trace = Some(format!("projects/{}/traces/{}", project_id, trace.trace_id));
        entry.span_id = trace.span_id.clone();
        entry.trace_sampled = trace.sampled;
    }
    if let Some(id) = &request.request_id {
        entry.labels.insert("request_id".to_string(), id.clone());
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.backend {
            Backend::Hosted { project_id, request, .. } => f
                .debug_struct("Logger")
                .field("backend", &"hosted")
                .field("project_id", project_id)
                .field("request", &request.as_ref().map(|r| &r.http_request.request_url))
                .finish(),
            Backend::Local(line_logger) => f
                .debug_struct("Logger")
                .field("backend", &"local")
                .field("line_logger", line_logger)
                .finish(),
        }
    }
}
