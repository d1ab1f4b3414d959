//! Transparent path proxying.
//!
//! # Responsibilities
//! - Forward any method under the mount prefix to the deals service
//! - Strip hop-by-hop headers before forwarding
//! - Relay upstream status, headers, and body unchanged
//!
//! # Design Decisions
//! - Streaming in both directions; bodies are never buffered
//! - GET/HEAD forwarded without a body, everything else verbatim
//! - No caching and no retries at this layer; repeating a request always
//!   reaches upstream again
//! - Upstream transport failure surfaces as 502 Bad Gateway

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header::HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::http::request::{RequestIdExt, X_REQUEST_ID};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Headers meaningful only per transport connection, per RFC 9110 §7.6.1.
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "host",
    "connection",
    "keep-alive",
    "transfer-encoding",
    "upgrade",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
];

/// Remove hop-by-hop headers in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

/// Build the upstream URL from the base, the path remainder, and the query.
pub fn target_url(base: &str, remainder: &str, query: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    let path = if remainder.is_empty() {
        "/"
    } else {
        remainder
    };
    match query {
        Some(q) if !q.is_empty() => format!("{}{}?{}", base, path, q),
        _ => format!("{}{}", base, path),
    }
}

/// Proxy handler for every method under the mount prefix.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request.request_id().to_string();
    let config = state.config.load_full();

    let base = (*state.env)(&config.proxy.base_env)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| config.proxy.default_base.clone());

    let method = request.method().clone();
    let method_str = method.to_string();

    let remainder = request
        .uri()
        .path()
        .strip_prefix(config.proxy.mount_prefix.as_str())
        .unwrap_or("")
        .to_string();
    let target = target_url(&base, &remainder, request.uri().query());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        target = %target,
        "Proxying request"
    );

    let uri: Uri = match target.parse() {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, target = %target, error = %e, "Invalid upstream URL");
            metrics::record_request(&method_str, 502, &base, start);
            return (StatusCode::BAD_GATEWAY, "Invalid upstream URL").into_response();
        }
    };

    let (parts, body) = request.into_parts();

    let mut headers = parts.headers.clone();
    strip_hop_by_hop(&mut headers);
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(X_REQUEST_ID, value);
    }

    let body = if matches!(method, Method::GET | Method::HEAD) {
        Body::empty()
    } else {
        body
    };

    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(h) = builder.headers_mut() {
        *h = headers;
    }
    let upstream_request = match builder.body(body) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream request");
            metrics::record_request(&method_str, 502, &base, start);
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    match state.client.request(upstream_request).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(&method_str, status.as_u16(), &base, start);
            tracing::debug!(
                request_id = %request_id,
                status = %status,
                "Upstream response relayed"
            );

            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_request(&method_str, 502, &base, start);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_joins_path_and_query() {
        assert_eq!(
            target_url("http://deals.internal", "/abc", Some("x=1")),
            "http://deals.internal/abc?x=1"
        );
    }

    #[test]
    fn test_target_url_mount_root_maps_to_slash() {
        assert_eq!(target_url("http://deals.internal", "", None), "http://deals.internal/");
    }

    #[test]
    fn test_target_url_strips_trailing_base_slash() {
        assert_eq!(
            target_url("http://deals.internal/", "/abc", None),
            "http://deals.internal/abc"
        );
    }

    #[test]
    fn test_target_url_ignores_empty_query() {
        assert_eq!(
            target_url("http://deals.internal", "/abc", Some("")),
            "http://deals.internal/abc"
        );
    }

    #[test]
    fn test_strip_hop_by_hop_removes_all_listed() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("gateway.local"));
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("te", HeaderValue::from_static("trailers"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get("host").is_none());
        assert!(headers.get("connection").is_none());
        assert!(headers.get("te").is_none());
        assert_eq!(
            headers.get("content-type"),
            Some(&HeaderValue::from_static("application/json"))
        );
    }
}
