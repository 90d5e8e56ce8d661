//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use futures_util::future::BoxFuture;
use request_logger::cloud::{CloudResult, EntrySink, HostedClient};
use request_logger::logging::entry::Entry;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Entry captured by [`RecordingClient`], with the log id it was sent to.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub log_id: String,
    pub entry: Entry,
}

/// Hosted client that keeps entries in memory.
#[derive(Default)]
pub struct RecordingClient {
    entries: Arc<Mutex<Vec<Recorded>>>,
    closes: AtomicUsize,
}

impl RecordingClient {
    pub fn entries(&self) -> Vec<Recorded> {
        self.entries.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

struct RecordingStream {
    log_id: String,
    entries: Arc<Mutex<Vec<Recorded>>>,
}

impl EntrySink for RecordingStream {
    fn log(&self, entry: Entry) {
        self.entries.lock().unwrap().push(Recorded {
            log_id: self.log_id.clone(),
            entry,
        });
    }
}

impl HostedClient for RecordingClient {
    fn logger(&self, log_id: &str) -> Arc<dyn EntrySink> {
        Arc::new(RecordingStream {
            log_id: log_id.to_string(),
            entries: self.entries.clone(),
        })
    }

    fn close(&self) -> BoxFuture<'_, CloudResult<()>> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}

/// In-memory writer shared between a `LineLogger` and the test.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Request received by the mock logging API.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

/// Mock of the logging API and metadata server on an ephemeral port.
#[derive(Clone)]
pub struct MockLoggingApi {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Captured>>>,
    write_status: Arc<AtomicU16>,
}

impl MockLoggingApi {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let write_status = Arc::new(AtomicU16::new(200));

        let (req_log, status) = (requests.clone(), write_status.clone());
        let app = Router::new().fallback(move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
            let (req_log, status) = (req_log.clone(), status.clone());
            async move { handle(req_log, status, method, uri, headers, body) }
        });

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            requests,
            write_status,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn metadata_url(&self) -> String {
        format!("http://{}/computeMetadata/v1", self.addr)
    }

    pub fn set_write_status(&self, status: u16) {
        self.write_status.store(status, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Captured> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == "/v2/entries:write")
            .collect()
    }

    /// Every entry from every write, in arrival order.
    pub fn written_entries(&self) -> Vec<serde_json::Value> {
        self.writes()
            .into_iter()
            .flat_map(|w| w.body["entries"].as_array().cloned().unwrap_or_default())
            .collect()
    }
}

fn handle(
    requests: Arc<Mutex<Vec<Captured>>>,
    write_status: Arc<AtomicU16>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let path = uri.path().to_string();
    requests.lock().unwrap().push(Captured {
        method,
        path: path.clone(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    });

    if path.ends_with("/instance/service-accounts/default/token") {
        if headers.get("metadata-flavor").map(|v| v == "Google") != Some(true) {
            return (StatusCode::FORBIDDEN, "missing Metadata-Flavor").into_response();
        }
        return (
            StatusCode::OK,
            [("content-type", "application/json")],
            r#"{"access_token":"meta-token","expires_in":3600,"token_type":"Bearer"}"#,
        )
            .into_response();
    }

    if path == "/v2/entries:write" {
        let status = StatusCode::from_u16(write_status.load(Ordering::SeqCst)).unwrap();
        return (status, "{}").into_response();
    }

    (StatusCode::NOT_FOUND, "not found").into_response()
}
