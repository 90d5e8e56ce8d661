//! Entry formatting.
//!
//! # Responsibilities
//! - Resolve the call site of a severity method
//! - Prefix the message with `file:line`
//! - Shape the structured record handed to the hosted backend
//!
//! # Design Decisions
//! - Call sites come from `#[track_caller]`, so the recorded frame is the
//!   caller of the facade and never the facade's own dispatch
//! - A missing location degrades to a placeholder instead of failing the call

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::panic::Location;

use crate::logging::request::HttpRequestInfo;
use crate::severity::Severity;

/// File name used when the call site cannot be resolved.
pub const UNKNOWN_FILE: &str = "???";

/// Source position of the code that issued a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    /// Placeholder site: `???`, line 0.
    pub const UNKNOWN: CallSite = CallSite {
        file: UNKNOWN_FILE,
        line: 0,
    };

    pub fn from_location(location: Option<&'static Location<'static>>) -> Self {
        match location {
            Some(loc) => Self {
                file: loc.file(),
                line: loc.line(),
            },
            None => Self::UNKNOWN,
        }
    }

    /// Final path component of the file, for compact local lines.
    pub fn short_file(&self) -> &'static str {
        self.file.rsplit(['/', '\\']).next().unwrap_or(self.file)
    }

    pub fn is_unknown(&self) -> bool {
        self.file == UNKNOWN_FILE
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Build the hosted payload: `"<file>:<line> <message>"`.
pub fn format_payload(site: &CallSite, args: fmt::Arguments<'_>) -> String {
    format!("{} {}", site, args)
}

/// Source location attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    /// int64 fields travel as JSON strings in the v2 API.
    #[serde(serialize_with = "serialize_as_string")]
    pub line: u32,
}

fn serialize_as_string<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// One structured log record for the hosted backend.
///
/// Built per call and handed to the backend; the facade keeps no reference.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    #[serde(rename = "textPayload")]
    pub payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_request: Option<HttpRequestInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub trace_sampled: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_location: Option<SourceLocation>,
}

impl Entry {
    /// Entry with only severity and payload set, stamped now.
    pub fn new(severity: Severity, payload: String) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            payload,
            http_request: None,
            trace: None,
            span_id: None,
            trace_sampled: false,
            labels: BTreeMap::new(),
            source_location: None,
        }
    }
}
