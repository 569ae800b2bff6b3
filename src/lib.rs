//! # Card Generator
//!
//! A small HTTP service that renders placeholder card images.
//!
//! `GET /card/{height}x{width}/` returns a PNG of the requested size, filled
//! with a flat color and labelled with its own dimensions. Rendered cards are
//! kept in a server-side cache for an hour, and every card carries an `ETag`
//! so browsers can revalidate with `If-None-Match`.
//!
//! ## Architecture
//!
//! - [`card`] - Validation, rendering, caching and entity tags
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use cardgen::{create_router, CardService, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = create_router(CardService::in_memory(), RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod card;
pub mod config;
pub mod error;
pub mod server;

// Re-export commonly used types
pub use card::{
    card_etag, validate_card_request, CardCacheKey, CardFormat, CardRenderer, CardRequest,
    CardResponse, CardService, CardStore, MemoryCardStore, Render,
};
pub use config::{Cli, Command, RenderConfig, ServeConfig, Settings};
pub use error::{CacheError, CardError, ValidationError, ValidationErrorKind, ValidationErrors};
pub use server::{create_router, AllowedHosts, AppState, RouterConfig};
