//! Per-request bookkeeping.
//!
//! # Responsibilities
//! - Reserve the request number before the handler runs
//! - Make it available to handlers as a request extension
//! - Write the request channel entries once the handler is done
//! - Record request metrics
//!
//! # Design Decisions
//! - Runs as middleware so every call is logged, whatever the outcome
//! - Handler (todo channel) entries always precede the request entries

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;
use crate::observability::metrics;

/// Header carrying the per-request UUID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Wrap a handler call with request channel logging.
pub async fn request_log_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let ctx = state.logging.begin_request();
    let resource = request.uri().path().to_string();
    let method = request.method().to_string();

    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    tracing::debug!(
        request_id = %request_id,
        request_number = ctx.number,
        method = %method,
        path = %resource,
        "Handling request"
    );

    request.extensions_mut().insert(ctx);
    let response = next.run(request).await;

    state.logging.finish_request(&ctx, &resource, &method);
    metrics::record_request(&resource, &method, response.status().as_u16(), ctx.started());

    response
}
