//! Request ids and per-request trace spans.
//!
//! An incoming `x-request-id` is kept; otherwise a UUID v4 is generated. The
//! id is echoed on the response and recorded on the request span.

use axum::body::Body;
use axum::http::{HeaderName, Request};
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tracing::Span;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// The request's id, if the set-id layer has run.
pub fn request_id<B>(req: &Request<B>) -> Option<&str> {
    req.extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
}

/// Span for `TraceLayer::make_span_with`.
pub fn make_request_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = request_id(req).unwrap_or("unknown"),
        method = %req.method(),
        path = %req.uri().path(),
    )
}
