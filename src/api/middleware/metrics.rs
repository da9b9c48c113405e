use super::request_id::REQUEST_ID_HEADER;
use axum::{
    extract::Request,
    http::{StatusCode, header::CONTENT_LENGTH},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Coarse bucket for a response status.
fn outcome(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        "failed"
    } else if status.is_client_error() {
        "rejected"
    } else {
        "ok"
    }
}

/// Logs one `request_completed` event per request under the `metrics` target.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let route = req.uri().path().to_owned();
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_owned();
    let body_bytes = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    let response = next.run(req).await;
    let status = response.status();

    tracing::info!(
        target: "metrics",
        request_id = %request_id,
        method = %method,
        route = %route,
        status = status.as_u16(),
        outcome = outcome(status),
        body_bytes,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request_completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_buckets() {
        assert_eq!(outcome(StatusCode::OK), "ok");
        assert_eq!(outcome(StatusCode::METHOD_NOT_ALLOWED), "rejected");
        assert_eq!(outcome(StatusCode::INTERNAL_SERVER_ERROR), "failed");
    }
}
