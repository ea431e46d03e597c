//! Request identification and request logging.
//!
//! # Responsibilities
//! - Assign an `x-request-id` (UUID) to requests that lack one and echo it back
//! - Log every request with its user and path
//! - Record request count and latency per method and status

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::observability::metrics;
use crate::security::UserContext;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that fills in a missing request ID.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Log the caller and path of every request.
pub async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let user = request
        .extensions()
        .get::<UserContext>()
        .map(|ctx| ctx.username.clone())
        .unwrap_or_else(|| "Anonymous".to_string());
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::info!(
        target: "request_log",
        request_id = %request_id,
        user = %user,
        method = %method,
        path = %path,
        "Request"
    );

    let response = next.run(request).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}
