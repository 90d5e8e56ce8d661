//! Request correlation.
//!
//! A [`RequestContext`] is a read-only snapshot of the inbound request taken
//! when the logger is built. Hosted entries carry it so the backend can group
//! log lines by request.

use axum::extract::ConnectInfo;
use axum::http::{request::Parts, Extensions, HeaderMap, Method, Request, Uri, Version};
use serde::Serialize;
use std::net::SocketAddr;

use crate::http::request::{RequestIdExt, X_REQUEST_ID};

pub const X_CLOUD_TRACE_CONTEXT: &str = "x-cloud-trace-context";
pub const TRACEPARENT: &str = "traceparent";

/// HTTP request details in the Cloud Logging `HttpRequest` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestInfo {
    pub request_method: String,
    pub request_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_ip: Option<String>,
    pub protocol: String,
}

/// Distributed trace identifiers propagated by the load balancer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    /// 16 lowercase hex digits.
    pub span_id: Option<String>,
    pub sampled: bool,
}

impl TraceContext {
    /// Read `X-Cloud-Trace-Context`, falling back to W3C `traceparent`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        header_str(headers, X_CLOUD_TRACE_CONTEXT)
            .and_then(Self::parse_cloud_trace_context)
            .or_else(|| header_str(headers, TRACEPARENT).and_then(Self::parse_traceparent))
    }

    /// `TRACE_ID[/SPAN_ID][;o=OPTIONS]`, span id in decimal.
    pub fn parse_cloud_trace_context(value: &str) -> Option<Self> {
        let (ids, options) = match value.split_once(";o=") {
            Some((ids, options)) => (ids, Some(options)),
            None => (value, None),
        };
        let (trace_id, span) = match ids.split_once('/') {
            Some((trace, span)) => (trace, Some(span)),
            None => (ids, None),
        };
        if trace_id.is_empty() || !trace_id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let span_id = span
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&id| id != 0)
            .map(|id| format!("{:016x}", id));
        let sampled = options
            .and_then(|o| o.parse::<u32>().ok())
            .is_some_and(|o| o & 1 == 1);

        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id,
            sampled,
        })
    }

    /// `00-<32 hex trace id>-<16 hex span id>-<2 hex flags>`.
    pub fn parse_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let (version, trace_id, span_id, flags) =
            (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        let is_hex = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit());
        if version != "00" || !is_hex(trace_id, 32) || !is_hex(span_id, 16) || !is_hex(flags, 2) {
            return None;
        }
        if trace_id.bytes().all(|b| b == b'0') {
            return None;
        }
        let flags = u8::from_str_radix(flags, 16).ok()?;
        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id: Some(span_id.to_ascii_lowercase()),
            sampled: flags & 1 == 1,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Snapshot of the inbound request a logger is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub http_request: HttpRequestInfo,
    pub trace: Option<TraceContext>,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self::capture(
            request.method(),
            request.uri(),
            request.version(),
            request.headers(),
            request.extensions(),
        )
    }

    pub fn from_parts(parts: &Parts) -> Self {
        Self::capture(&parts.method, &parts.uri, parts.version, &parts.headers, &parts.extensions)
    }

    fn capture(
        method: &Method,
        uri: &Uri,
        version: Version,
        headers: &HeaderMap,
        extensions: &Extensions,
    ) -> Self {
        let header = |name: &str| header_str(headers, name).map(str::to_string);

        let remote_ip = extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .or_else(|| {
                header("x-forwarded-for")
                    .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
                    .filter(|ip| !ip.is_empty())
            });

        let request_id = extensions
            .request_id()
            .map(str::to_string)
            .or_else(|| header(X_REQUEST_ID));

        Self {
            http_request: HttpRequestInfo {
                request_method: method.to_string(),
                request_url: uri.to_string(),
                user_agent: header("user-agent"),
                referer: header("referer"),
                remote_ip,
                protocol: format!("{:?}", version),
            },
            trace: TraceContext::from_headers(headers),
            request_id,
        }
    }
}
