//! Test utilities for integration tests.
//!
//! Instrumented renderers and stores, plus helpers for issuing requests
//! against the router.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageReader};
use tower::ServiceExt;

use cardgen::card::{CardCacheKey, CardFormat, CardRenderer, CardRequest, CardStore, Render};
use cardgen::error::{CacheError, CardError};
use cardgen::{create_router, CardService, MemoryCardStore, RouterConfig};

// =============================================================================
// Counting Renderer
// =============================================================================

/// Renderer that delegates to [`CardRenderer`] and counts invocations.
#[derive(Clone, Default)]
pub struct CountingRenderer {
    calls: Arc<AtomicUsize>,
    inner: CardRenderer,
}

impl CountingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the call counter.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Render for CountingRenderer {
    fn render(&self, request: &CardRequest, format: CardFormat) -> Result<Bytes, CardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.render(request, format)
    }
}

/// Renderer that always fails to encode.
pub struct FailingRenderer;

impl Render for FailingRenderer {
    fn render(&self, _request: &CardRequest, _format: CardFormat) -> Result<Bytes, CardError> {
        Err(CardError::Encode {
            message: "encoder unavailable".to_string(),
        })
    }
}

// =============================================================================
// Unavailable Store
// =============================================================================

/// Card store whose backend is unreachable; counts attempted operations.
#[derive(Default)]
pub struct UnavailableStore {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl CardStore for UnavailableStore {
    async fn get(&self, _key: &CardCacheKey) -> Result<Option<Bytes>, CacheError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: CardCacheKey, _data: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

// =============================================================================
// Router Helpers
// =============================================================================

/// Router with a counting renderer and an in-memory store.
///
/// Returns the router and the render call counter.
pub fn counting_router(config: RouterConfig) -> (Router, Arc<AtomicUsize>) {
    let renderer = CountingRenderer::new();
    let counter = renderer.counter();
    let service = CardService::new(renderer, MemoryCardStore::new());
    (create_router(service, config.with_tracing(false)), counter)
}

/// Router with default components.
pub fn default_router() -> Router {
    create_router(
        CardService::in_memory(),
        RouterConfig::new().with_tracing(false),
    )
}

/// Issue a GET request with optional extra headers.
pub async fn get(router: &Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::empty()).unwrap();
    router.clone().oneshot(request).await.unwrap()
}

/// Collect a response body.
pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Decode image bytes of any supported format.
pub fn decode_image(data: &[u8]) -> DynamicImage {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap()
}

/// Check for the PNG signature.
pub fn is_valid_png(data: &[u8]) -> bool {
    data.starts_with(b"\x89PNG\r\n\x1a\n")
}
