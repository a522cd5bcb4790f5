//! Per-request trace-ID propagation and request/response logging.

use std::time::Instant;

use axum::body::Body;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Extract (or generate) the request's trace ID, run the handler inside a
/// span carrying it, and echo it back on the response.
pub async fn trace_middleware(mut req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("request started");

        // A v4 UUID string is always a valid header value.
        if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
            req.headers_mut().insert(X_TRACE_ID, value.clone());
            let mut response = next.run(req).await;
            response.headers_mut().insert(X_TRACE_ID, value);

            info!(
                status = response.status().as_u16(),
                latency_ms = start_time.elapsed().as_millis(),
                "request finished"
            );
            response
        } else {
            next.run(req).await
        }
    }
    .instrument(span)
    .await
}
