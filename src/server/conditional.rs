//! Conditional GET for card responses.
//!
//! [`conditional_get`] is attached to the card route when the router is
//! built. It computes the card's entity tag from the path before the handler
//! runs:
//!
//! - if `If-None-Match` names that tag (or is `*`), it answers
//!   `304 Not Modified` and the handler never runs
//! - otherwise it runs the handler and adds the `ETag` header to successful
//!   responses
//!
//! Paths that do not describe a valid card pass straight through untouched.

use axum::{
    extract::{Path, Request},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::handlers::CardPathParams;
use crate::card::{quoted_card_etag, validate_card_request};

/// Middleware implementing `If-None-Match` handling for `/card/{h}x{w}/`.
pub async fn conditional_get(
    Path(params): Path<CardPathParams>,
    request: Request,
    next: Next,
) -> Response {
    let card = params
        .split()
        .and_then(|(height, width)| validate_card_request(Some(height), Some(width)).ok());

    let Some(card) = card else {
        return next.run(request).await;
    };

    let etag = quoted_card_etag(card.width(), card.height());

    if if_none_match(request.headers(), &etag) {
        debug!(etag = %etag, "Card not modified");
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    let mut response = next.run(request).await;

    if response.status().is_success() && !response.headers().contains_key(header::ETAG) {
        if let Ok(value) = HeaderValue::from_str(&etag) {
            response.headers_mut().insert(header::ETAG, value);
        }
    }

    response
}

/// Whether the request's `If-None-Match` header matches `etag`.
///
/// Uses weak comparison: a `W/` prefix on either side is ignored.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    let target = strip_weak(etag);

    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || strip_weak(candidate) == target)
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}
