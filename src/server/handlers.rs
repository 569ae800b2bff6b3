//! HTTP request handlers for the card generator.
//!
//! # Endpoints
//!
//! - `GET /card/{height}x{width}/` - Serve a card
//! - `GET /card/{height}x{width}` - Redirect to the slashed form
//! - `GET /` - Homepage with example links
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::home::render_homepage;
use super::hosts::request_host;
use crate::card::{
    validate_card_request, CardFormat, CardService, CardStore, Render, MAX_CACHE_TTL,
};
use crate::error::CardError;

/// Body of every 400 response for a rejected card.
pub const INVALID_CARD_BODY: &str = "Invalid Card Request";

/// Header reporting whether a card came from the server cache.
pub const CACHE_HIT_HEADER: HeaderName = HeaderName::from_static("x-card-cache-hit");

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the card service.
pub struct AppState<R: Render, C: CardStore> {
    /// The card service for processing card requests
    pub card_service: Arc<CardService<R, C>>,

    /// Cache-Control max-age in seconds (defaults to 1 hour)
    pub cache_max_age: u64,

    /// Include error details in 500 responses
    pub debug: bool,

    /// Show the showcase links on the homepage
    pub showcase: bool,
}

impl<R: Render, C: CardStore> AppState<R, C> {
    pub fn new(card_service: CardService<R, C>) -> Self {
        let cache_max_age = card_service.ttl().min(MAX_CACHE_TTL).as_secs();
        Self {
            card_service: Arc::new(card_service),
            cache_max_age,
            debug: false,
            showcase: true,
        }
    }

    pub fn with_cache_max_age(mut self, cache_max_age: u64) -> Self {
        self.cache_max_age = cache_max_age;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_showcase(mut self, showcase: bool) -> Self {
        self.showcase = showcase;
        self
    }
}

impl<R: Render, C: CardStore> Clone for AppState<R, C> {
    fn clone(&self) -> Self {
        Self {
            card_service: Arc::clone(&self.card_service),
            cache_max_age: self.cache_max_age,
            debug: self.debug,
            showcase: self.showcase,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Path parameters for card requests.
///
/// Extracted from: `/card/{dimensions}/` where dimensions is
/// `{height}x{width}`
#[derive(Debug, Deserialize)]
pub struct CardPathParams {
    pub dimensions: String,
}

impl CardPathParams {
    /// Split `{height}x{width}` into its digit runs.
    ///
    /// Returns `None` unless both sides are non-empty ASCII digit strings,
    /// in which case the path does not name a card at all.
    pub fn split(&self) -> Option<(&str, &str)> {
        let (height, width) = self.dimensions.split_once('x')?;
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

        if digits(height) && digits(width) {
            Some((height, width))
        } else {
            None
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// A failed card request, carrying whether error details may be shown.
pub struct HandlerError {
    pub error: CardError,
    pub debug: bool,
}

impl HandlerError {
    pub fn new(error: CardError, debug: bool) -> Self {
        Self { error, debug }
    }
}

/// Validation failures become a plain 400; anything else is a 500.
///
/// 400s are logged at DEBUG (client mistakes are expected), 500s at ERROR.
impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match &self.error {
            CardError::Validation(errors) => {
                debug!("Rejected card request: {}", errors);
                (StatusCode::BAD_REQUEST, INVALID_CARD_BODY).into_response()
            }
            CardError::Encode { .. } | CardError::Render { .. } => {
                error!(status = 500, "Server error: {}", self.error);
                let body = if self.debug {
                    format!("Internal Server Error\n\n{}", self.error)
                } else {
                    "Internal Server Error".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle card requests.
///
/// # Endpoint
///
/// `GET /card/{height}x{width}/`
///
/// # Response
///
/// - `200 OK`: PNG card
/// - `400 Bad Request`: Height or width outside 1-1024
/// - `404 Not Found`: Path is not `{digits}x{digits}`
/// - `500 Internal Server Error`: Rendering failed
///
/// # Headers
///
/// - `Content-Type: image/png`
/// - `Cache-Control: public, max-age={cache_max_age}`
/// - `X-Card-Cache-Hit: true|false`
///
/// The `ETag` header is added by the conditional GET middleware.
pub async fn card_handler<R: Render, C: CardStore>(
    State(state): State<AppState<R, C>>,
    Path(params): Path<CardPathParams>,
) -> Result<Response, HandlerError> {
    let Some((height, width)) = params.split() else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let request = validate_card_request(Some(height), Some(width))
        .map_err(|e| HandlerError::new(e.into(), state.debug))?;

    let format = CardFormat::Png;
    let response = state
        .card_service
        .get_card(request, format)
        .await
        .map_err(|e| HandlerError::new(e, state.debug))?;

    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (
                header::CACHE_CONTROL,
                format!("public, max-age={}", state.cache_max_age),
            ),
            (CACHE_HIT_HEADER, response.cache_hit.to_string()),
        ],
        response.data,
    )
        .into_response())
}

/// Redirect `/card/{height}x{width}` to `/card/{height}x{width}/`.
///
/// Only paths that the card route would match are redirected.
pub async fn append_slash_handler(
    Path(params): Path<CardPathParams>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    if params.split().is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }

    let location = match uri.query() {
        Some(query) => format!("/card/{}/?{}", params.dimensions, query),
        None => format!("/card/{}/", params.dimensions),
    };

    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

/// Handle homepage requests.
///
/// # Endpoint
///
/// `GET /`
///
/// Links are absolute, built from the request's `Host` header.
pub async fn index_handler<R: Render, C: CardStore>(
    State(state): State<AppState<R, C>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Html<String> {
    let host = request_host(&headers, &uri);
    Html(render_homepage(host.as_deref(), state.showcase))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
