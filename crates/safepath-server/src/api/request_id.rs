use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation id attached to every request as an extension.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The caller's id when it is usable, otherwise a fresh uuid.
fn resolve(headers: &HeaderMap) -> (RequestId, HeaderValue) {
    let supplied = headers
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| Some(RequestId(value.to_str().ok()?.trim().to_string())))
        .filter(|id| !id.0.is_empty());
    let id = supplied.unwrap_or_else(|| RequestId(uuid::Uuid::new_v4().to_string()));
    // A trimmed visible-ASCII string or a uuid is always a valid header value.
    let value = HeaderValue::from_str(&id.0).unwrap_or_else(|_| HeaderValue::from_static("invalid"));
    (id, value)
}

/// Tag the request and its response with `x-request-id` and log the outcome
/// inside a span carrying the id.
pub async fn ensure_request_id(mut request: Request, next: Next) -> Response {
    let (id, header) = resolve(request.headers());
    request
        .headers_mut()
        .insert(REQUEST_ID_HEADER, header.clone());
    request.extensions_mut().insert(id.clone());

    let span = tracing::info_span!(
        "http",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %id,
    );
    let started = Instant::now();

    let mut response = next.run(request).instrument(span.clone()).await;

    span.in_scope(|| {
        tracing::debug!(
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
    });
    response.headers_mut().insert(REQUEST_ID_HEADER, header);
    response
}
