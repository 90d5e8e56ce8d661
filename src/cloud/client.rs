//! Cloud Logging API client.
//!
//! # Responsibilities
//! - Accept entries from any number of streams without blocking
//! - Batch whatever is ready and write it with `entries:write`
//! - Report the first write failure when the client is closed

use futures_util::future::BoxFuture;
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, OnceCell};
use tokio::task::JoinHandle;
use url::Url;

use crate::cloud::auth::TokenSource;
use crate::cloud::resource::MonitoredResource;
use crate::cloud::types::{CloudError, CloudResult};
use crate::cloud::{EntrySink, HostedClient};
use crate::config::CloudConfig;
use crate::logging::entry::Entry;

/// Entry plus the log it belongs to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEntry {
    log_name: String,
    #[serde(flatten)]
    entry: Entry,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteRequest<'a> {
    resource: &'a MonitoredResource,
    entries: &'a [WireEntry],
    partial_success: bool,
}

enum Message {
    Entry(WireEntry),
    Close(oneshot::Sender<CloudResult<()>>),
}

/// Client bound to one project.
///
/// Creating it performs no network I/O; the writer task starts on the
/// current Tokio runtime.
pub struct CloudLoggingClient {
    project_id: String,
    tx: mpsc::UnboundedSender<Message>,
    /// Outcome of the one shutdown; concurrent closers all wait on it.
    closed: OnceCell<CloudResult<()>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl CloudLoggingClient {
    pub fn new(config: &CloudConfig, project_id: &str) -> CloudResult<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CloudError::NoRuntime)?;
        let write_url = write_url(&config.endpoint)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let resource = config
            .resource
            .clone()
            .unwrap_or_else(|| MonitoredResource::global(project_id));

        let writer = Writer {
            tokens: TokenSource::new(config.access_token.clone(), &config.metadata_url),
            http,
            write_url,
            resource,
            batch_size: config.batch_size.max(1),
            first_error: None,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let worker = runtime.spawn(writer.run(rx));

        tracing::info!(
            project_id = %project_id,
            endpoint = %config.endpoint,
            "Cloud Logging client created"
        );

        Ok(Self {
            project_id: project_id.to_string(),
            tx,
            closed: OnceCell::new(),
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Full resource name of a log, `projects/<project>/logs/<log id>`.
    pub fn log_name(&self, log_id: &str) -> String {
        format!("projects/{}/logs/{}", self.project_id, log_id.replace('/', "%2F"))
    }
}

impl HostedClient for CloudLoggingClient {
    fn logger(&self, log_id: &str) -> Arc<dyn EntrySink> {
        Arc::new(CloudLogStream {
            log_name: self.log_name(log_id),
            tx: self.tx.clone(),
        })
    }

    fn close(&self) -> BoxFuture<'_, CloudResult<()>> {
        Box::pin(async move { self.closed.get_or_init(|| self.shutdown()).await.clone() })
    }
}

impl CloudLoggingClient {
    /// Flush the writer and stop it. Runs at most once per client.
    async fn shutdown(&self) -> CloudResult<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Message::Close(reply_tx))
            .map_err(|_| CloudError::Closed)?;
        let result = reply_rx.await.map_err(|_| CloudError::Closed)?;

        let worker = self.worker.lock().ok().and_then(|mut w| w.take());
        if let Some(worker) = worker {
            let _ = worker.await;
        }

        tracing::debug!(project_id = %self.project_id, ok = result.is_ok(), "Cloud Logging client closed");
        result
    }
}

impl std::fmt::Debug for CloudLoggingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudLoggingClient")
            .field("project_id", &self.project_id)
            .field("closed", &self.closed.initialized())
            .finish()
    }
}

/// Stream handle returned by [`CloudLoggingClient::logger`].
struct CloudLogStream {
    log_name: String,
    tx: mpsc::UnboundedSender<Message>,
}

impl EntrySink for CloudLogStream {
    fn log(&self, entry: Entry) {
        let message = Message::Entry(WireEntry {
            log_name: self.log_name.clone(),
            entry,
        });
        if self.tx.send(message).is_err() {
            tracing::debug!(log_name = %self.log_name, "Logging client closed, dropping entry");
        }
    }
}

fn write_url(endpoint: &str) -> CloudResult<Url> {
    let invalid = |reason: String| CloudError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason,
    };
    let base = Url::parse(&format!("{}/", endpoint.trim_end_matches('/')))
        .map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("not a base URL".to_string()));
    }
    base.join("v2/entries:write").map_err(|e| invalid(e.to_string()))
}

/// Drop messages that arrived after a close, returning how many were entries.
fn discard(messages: impl Iterator<Item = Message>) -> usize {
    let mut dropped = 0;
    for message in messages {
        match message {
            Message::Entry(_) => dropped += 1,
            Message::Close(reply) => {
                let _ = reply.send(Err(CloudError::Closed));
            }
        }
    }
    dropped
}

/// Background task that owns the HTTP client and token cache.
struct Writer {
    tokens: TokenSource,
    http: reqwest::Client,
    write_url: Url,
    resource: MonitoredResource,
    batch_size: usize,
    first_error: Option<CloudError>,
}

impl Writer {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>) {
        let mut messages = Vec::with_capacity(self.batch_size);
        let mut batch = Vec::with_capacity(self.batch_size);

        loop {
            // Zero means every sender is gone.
            if rx.recv_many(&mut messages, self.batch_size).await == 0 {
                self.flush(&mut batch).await;
                return;
            }

            let mut pending = messages.drain(..);
            while let Some(message) = pending.next() {
                match message {
                    Message::Entry(entry) => {
                        batch.push(entry);
                        if batch.len() >= self.batch_size {
                            self.flush(&mut batch).await;
                        }
                    }
                    Message::Close(reply) => {
                        self.flush(&mut batch).await;
                        rx.close();
                        let late = std::iter::from_fn(|| rx.try_recv().ok());
                        let dropped = discard(pending.chain(late));
                        if dropped > 0 {
                            tracing::debug!(dropped, "Logging client closed, dropping queued entries");
                        }
                        let result = match self.first_error.take() {
                            Some(e) => Err(e),
                            None => Ok(()),
                        };
                        let _ = reply.send(result);
                        return;
                    }
                }
            }

            self.flush(&mut batch).await;
        }
    }

    async fn flush(&mut self, batch: &mut Vec<WireEntry>) {
        if batch.is_empty() {
            return;
        }
        let entries = std::mem::take(batch);
        if let Err(e) = self.write(&entries).await {
            tracing::warn!(error = %e, dropped = entries.len(), "Failed to write log entries");
            if self.first_error.is_none() {
                self.first_error = Some(e);
            }
        }
    }

    async fn write(&mut self, entries: &[WireEntry]) -> CloudResult<()> {
        let token = self.tokens.token(&self.http).await?;
        let request = WriteRequest {
            resource: &self.resource,
            entries,
            partial_success: true,
        };

        let response = self
            .http
            .post(self.write_url.clone())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate();
        }
        let body = response.text().await.unwrap_or_default();
        Err(CloudError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
