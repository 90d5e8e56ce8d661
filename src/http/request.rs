//! Request ID assignment.
//!
//! # Responsibilities
//! - Reuse an incoming `X-Request-ID` or generate a UUID v4
//! - Store the id in request extensions for loggers to pick up
//! - Echo the id on the response
//!
//! # Design Decisions
//! - Request ID added as early as possible so every log entry can carry it
//! - Assignment and echo are `tower-http`'s request-id layers

use axum::http::{Extensions, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub use tower_http::request_id::RequestId;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that assigns an id to requests without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request's id onto its response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Access to the id assigned by [`set_request_id_layer`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl RequestIdExt for Extensions {
    fn request_id(&self) -> Option<&str> {
        self.get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .filter(|id| !id.is_empty())
    }
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.extensions().request_id()
    }
}
