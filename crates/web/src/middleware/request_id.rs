//! Request correlation IDs.
//!
//! Each request carries an ID that shows up in its tracing span, in Sentry
//! events and in the `x-request-id` response header. An ID supplied by a
//! reverse proxy is reused when it looks sane; otherwise a UUID v4 is
//! generated.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream ID we pass through.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// The ID assigned to the current request, available as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Reuse `candidate` if it is short printable ASCII without spaces.
fn accept_upstream(candidate: &str) -> Option<String> {
    let valid = !candidate.is_empty()
        && candidate.len() <= MAX_UPSTREAM_ID_LEN
        && candidate.bytes().all(|b| b.is_ascii_graphic());
    valid.then(|| candidate.to_string())
}

/// Middleware that assigns every request an ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(accept_upstream)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_id_is_reused() {
        assert_eq!(accept_upstream("abc-123").as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_bad_upstream_ids_are_replaced() {
        assert!(accept_upstream("").is_none());
        assert!(accept_upstream("has space").is_none());
        assert!(accept_upstream(&"x".repeat(MAX_UPSTREAM_ID_LEN + 1)).is_none());
    }
}
