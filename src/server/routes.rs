//! Router configuration for the card generator.
//!
//! # Route Structure
//!
//! ```text
//! /                              - Homepage
//! /health                        - Health check
//! /card/{height}x{width}/        - Card endpoint (conditional GET)
//! /card/{height}x{width}         - Redirect to the slashed form
//! ```
//!
//! Every route sits behind the allowed-hosts check, the `X-Frame-Options`
//! header, CORS and (optionally) request tracing.
//!
//! # Example
//!
//! ```ignore
//! use cardgen::card::CardService;
//! use cardgen::server::{create_router, RouterConfig};
//!
//! let router = create_router(CardService::in_memory(), RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use http::header::{CONTENT_TYPE, IF_NONE_MATCH, X_FRAME_OPTIONS};
use http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::conditional::conditional_get;
use super::handlers::{
    append_slash_handler, card_handler, health_handler, index_handler, AppState,
};
use super::hosts::{allowed_hosts_middleware, AllowedHosts};
use crate::card::{CardService, CardStore, Render};
use crate::config::Settings;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Hosts the server answers to
    pub allowed_hosts: AllowedHosts,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds (None = use the card TTL)
    pub cache_max_age: Option<u64>,

    /// Include error details in 500 responses
    pub debug: bool,

    /// Show showcase links on the homepage
    pub showcase: bool,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration with defaults.
    ///
    /// By default:
    /// - Any host is allowed
    /// - CORS allows any origin
    /// - Cache max-age follows the card TTL
    /// - Debug details are hidden
    /// - The showcase is shown
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            allowed_hosts: AllowedHosts::any(),
            cors_origins: None,
            cache_max_age: None,
            debug: false,
            showcase: true,
            enable_tracing: true,
        }
    }

    /// Derive the router configuration from startup settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            allowed_hosts: settings.allowed_hosts.clone(),
            cors_origins: settings.cors_origins.clone(),
            cache_max_age: Some(settings.cache_ttl.as_secs()),
            debug: settings.debug,
            showcase: settings.showcase,
            enable_tracing: settings.enable_tracing,
        }
    }

    pub fn with_allowed_hosts(mut self, allowed_hosts: AllowedHosts) -> Self {
        self.allowed_hosts = allowed_hosts;
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u64) -> Self {
        self.cache_max_age = Some(seconds);
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

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// The conditional GET middleware is attached directly to the card route, so
/// a matching `If-None-Match` short-circuits before the card service runs.
pub fn create_router<R, C>(card_service: CardService<R, C>, config: RouterConfig) -> Router
where
    R: Render,
    C: CardStore,
{
    let mut app_state = AppState::new(card_service)
        .with_debug(config.debug)
        .with_showcase(config.showcase);
    if let Some(max_age) = config.cache_max_age {
        app_state = app_state.with_cache_max_age(max_age);
    }

    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/", get(index_handler::<R, C>))
        .route("/health", get(health_handler))
        .route(
            "/card/{dimensions}/",
            get(card_handler::<R, C>).layer(middleware::from_fn(conditional_get)),
        )
        .route("/card/{dimensions}", get(append_slash_handler))
        .with_state(app_state)
        .layer(middleware::from_fn_with_state(
            config.allowed_hosts.clone(),
            allowed_hosts_middleware,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(cors);

    // Add tracing if enabled
    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, IF_NONE_MATCH])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
