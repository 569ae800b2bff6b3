//! `Host` header checking.
//!
//! Requests are only served when their `Host` matches one of the configured
//! patterns:
//!
//! - `*` matches any host
//! - `.example.com` matches `example.com` and every subdomain of it
//! - anything else must match exactly (case-insensitive)
//!
//! The port is ignored when matching.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Body of the response sent for a disallowed host.
pub const BAD_REQUEST_BODY: &str = "Bad Request (400)";

/// Set of host patterns this server answers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedHosts {
    patterns: Vec<String>,
}

impl AllowedHosts {
    /// Build from raw patterns. Blank patterns are dropped.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    /// Allow every host.
    pub fn any() -> Self {
        Self::new(["*"])
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Check a raw `Host` value, with or without a port.
    pub fn is_allowed(&self, host: &str) -> bool {
        let domain = strip_port(host).trim_end_matches('.').to_ascii_lowercase();

        self.patterns.iter().any(|pattern| {
            if pattern == "*" {
                true
            } else if let Some(suffix) = pattern.strip_prefix('.') {
                domain == suffix || domain.ends_with(pattern.as_str())
            } else {
                domain == *pattern
            }
        })
    }
}

impl Default for AllowedHosts {
    fn default() -> Self {
        Self::any()
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal, keep the brackets
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((domain, port)) if port.bytes().all(|b| b.is_ascii_digit()) => domain,
        _ => host,
    }
}

/// The host a request was addressed to: the `Host` header, falling back to
/// the URI authority (HTTP/2).
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
}

/// Middleware rejecting requests whose host is not allowed with 400.
pub async fn allowed_hosts_middleware(
    State(allowed): State<AllowedHosts>,
    request: Request,
    next: Next,
) -> Response {
    let host = request_host(request.headers(), request.uri()).unwrap_or_default();

    if !allowed.is_allowed(&host) {
        warn!(host = %host, path = %request.uri().path(), "Rejected request for disallowed host");
        return (StatusCode::BAD_REQUEST, BAD_REQUEST_BODY).into_response();
    }

    next.run(request).await
}
