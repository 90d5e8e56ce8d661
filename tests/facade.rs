//! Logger facade behavior over both backends.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use request_logger::config::{LocalConfig, PROJECT_ENV};
use request_logger::logging::local::LineLogger;
use request_logger::logging::request::RequestContext;
use request_logger::{errorf, infof, Logger, LoggerConfig, Severity};

mod common;
use common::{MockLoggingApi, RecordingClient, SharedBuf};

/// Serializes tests that touch the process environment.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn local_logger() -> (Logger, SharedBuf) {
    let buf = SharedBuf::default();
    let line_logger = LineLogger::new(buf.clone(), LocalConfig { timestamps: false, utc: false });
    (Logger::local(Arc::new(line_logger)), buf)
}

fn hosted_logger(request: Option<&RequestContext>) -> (Logger, Arc<RecordingClient>) {
    let client = Arc::new(RecordingClient::default());
    let logger = Logger::hosted(client.clone(), "test-proj", "request", request);
    (logger, client)
}

/// Call the named method for `severity`, returning the line it was called on.
fn call_named(logger: &Logger, severity: Severity) -> u32 {
    let line = line!() + 2;
    match severity {
        Severity::Default => logger.default(format_args!("level {}", severity)),
        Severity::Debug => logger.debug(format_args!("level {}", severity)),
        Severity::Info => logger.info(format_args!("level {}", severity)),
        Severity::Notice => logger.notice(format_args!("level {}", severity)),
        Severity::Warning => logger.warning(format_args!("level {}", severity)),
        Severity::Error => logger.error(format_args!("level {}", severity)),
        Severity::Critical => logger.critical(format_args!("level {}", severity)),
        Severity::Alert => logger.alert(format_args!("level {}", severity)),
        Severity::Emergency => logger.emergency(format_args!("level {}", severity)),
    }
    let offset = Severity::ALL.iter().position(|s| *s == severity).unwrap() as u32;
    line + offset
}

#[test]
fn test_hosted_every_level_emits_one_entry() {
    let (logger, client) = hosted_logger(None);
    assert!(logger.is_hosted());
    assert_eq!(logger.project_id(), Some("test-proj"));

    for severity in Severity::ALL {
        let line = call_named(&logger, severity);
        let entries = client.entries();
        let last = entries.last().unwrap();

        assert_eq!(last.log_id, "request");
        assert_eq!(last.entry.severity, severity);
        let prefix = format!("{}:{} ", file!(), line);
        assert!(
            last.entry.payload.starts_with(&prefix),
            "payload {:?} should start with {:?}",
            last.entry.payload,
            prefix
        );
        assert!(last.entry.payload.ends_with(&format!("level {}", severity)));
    }
    assert_eq!(client.entries().len(), Severity::ALL.len());
}

#[test]
fn test_local_every_level_writes_one_line() {
    let (logger, buf) = local_logger();
    assert!(!logger.is_hosted());

    for severity in Severity::ALL {
        let line = call_named(&logger, severity);
        let lines = buf.lines();
        assert_eq!(
            lines.last().unwrap(),
            &format!("{} facade.rs:{}: level {}", severity, line, severity)
        );
    }
    assert_eq!(buf.lines().len(), Severity::ALL.len());
}

#[test]
fn test_interleaved_local_lines_keep_their_own_prefix() {
    let (logger, buf) = local_logger();
    let logger = Arc::new(logger);

    let handles: Vec<_> = [Severity::Error, Severity::Debug]
        .into_iter()
        .map(|severity| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    logger.log(severity, format_args!("from {} #{}", severity, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = buf.lines();
    assert_eq!(lines.len(), 400);
    for line in lines {
        let (prefix, rest) = line.split_once(' ').unwrap();
        assert!(
            rest.contains(&format!("from {} #", prefix)),
            "line carries a foreign prefix: {line}"
        );
    }
}

#[test]
fn test_errorf_local_example() {
    let (logger, buf) = local_logger();
    errorf!(logger, "bad value: {}", 42);

    let lines = buf.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("ERROR"));
    assert!(lines[0].contains("bad value: 42"));
}

#[test]
fn test_errorf_hosted_example() {
    let (logger, client) = hosted_logger(None);
    errorf!(logger, "bad value: {}", 42);

    let entries = client.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entry.severity, Severity::Error);
    assert!(entries[0].entry.payload.ends_with("bad value: 42"));
    assert!(entries[0].entry.payload.starts_with(file!()));
}

#[test]
fn test_missing_location_uses_placeholder() {
    let (logger, client) = hosted_logger(None);
    logger.log_at(Severity::Warning, None, format_args!("no frame"));
    let entries = client.entries();
    assert_eq!(entries[0].entry.payload, "???:0 no frame");
    assert!(entries[0].entry.source_location.is_none());

    let (logger, buf) = local_logger();
    logger.log_at(Severity::Warning, None, format_args!("no frame"));
    assert_eq!(buf.lines(), ["WARNING ???:0: no frame"]);
}

#[test]
fn test_hosted_entries_carry_request() {
    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/orders/9")
        .header("x-cloud-trace-context", "0af7651916cd43dd8448eb211c80319c/42;o=1")
        .header("x-request-id", "req-77")
        .body(())
        .unwrap();
    let context = RequestContext::from_request(&request);

    let (logger, client) = hosted_logger(Some(&context));
    infof!(logger, "looking up order {}", 9);

    let entry = &client.entries()[0].entry;
    let http = entry.http_request.as_ref().unwrap();
    assert_eq!(http.request_method, "GET");
    assert_eq!(http.request_url, "/orders/9");
    assert_eq!(
        entry.trace.as_deref(),
        Some("projects/test-proj/traces/0af7651916cd43dd8448eb211c80319c")
    );
    assert_eq!(entry.span_id.as_deref(), Some("000000000000002a"));
    assert!(entry.trace_sampled);
    assert_eq!(entry.labels["request_id"], "req-77");
}

#[test]
fn test_unset_project_never_creates_client() {
    // No runtime: building a hosted client here would fail.
    let config = LoggerConfig::from_lookup(|_| None);
    let logger = Logger::from_config(&config, None).unwrap();
    assert!(!logger.is_hosted());

    let context = RequestContext::default();
    let logger = Logger::from_config(&config, Some(&context)).unwrap();
    assert!(!logger.is_hosted());
}

#[tokio::test]
async fn test_close_local_is_noop() {
    let (logger, buf) = local_logger();
    logger.close().await.unwrap();
    logger.close().await.unwrap();
    assert!(buf.lines().is_empty());
}

#[tokio::test]
async fn test_close_hosted_releases_client() {
    let (logger, client) = hosted_logger(None);
    logger.close().await.unwrap();
    assert_eq!(client.close_count(), 1);
}

#[test]
fn test_env_constructors_without_project_are_local() {
    let _guard = env_lock();
    std::env::remove_var(PROJECT_ENV);

    // No runtime here, so a hosted client could not be built.
    let logger = Logger::new(None).unwrap();
    assert!(!logger.is_hosted());
    assert_eq!(logger.project_id(), None);

    let request = axum::http::Request::builder()
        .uri("/health")
        .header("x-request-id", "req-env")
        .body(())
        .unwrap();
    let logger = Logger::for_request(&request).unwrap();
    assert!(!logger.is_hosted());
}

#[tokio::test]
async fn test_env_constructors_with_project_are_hosted() {
    let (logger, request_logger, mut config) = {
        let _guard = env_lock();
        std::env::set_var(PROJECT_ENV, "env-proj");
        let request = axum::http::Request::builder()
            .uri("/orders")
            .body(())
            .unwrap();
        let built = (
            Logger::new(None),
            Logger::for_request(&request),
            LoggerConfig::from_env(),
        );
        std::env::remove_var(PROJECT_ENV);
        built
    };

    // Nothing logged, so closing needs no network.
    let logger = logger.unwrap();
    assert!(logger.is_hosted());
    assert_eq!(logger.project_id(), Some("env-proj"));
    logger.close().await.unwrap();

    let request_logger = request_logger.unwrap();
    assert!(request_logger.is_hosted());
    request_logger.close().await.unwrap();

    let api = MockLoggingApi::start().await;
    config.cloud.endpoint = api.endpoint();
    config.cloud.metadata_url = api.metadata_url();
    config.cloud.access_token = Some("env-token".to_string());

    let logger = Logger::from_config(&config, None).unwrap();
    errorf!(logger, "from env project");
    logger.close().await.unwrap();

    let entries = api.written_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["logName"], "projects/env-proj/logs/request");
    assert!(entries[0]["textPayload"].as_str().unwrap().ends_with("from env project"));
}
