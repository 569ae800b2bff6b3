//! Cache effectiveness integration tests.
//!
//! Tests verify:
//! - Repeated requests are served from the server cache without re-rendering
//! - Invalid requests never reach the renderer
//! - An unreachable cache backend degrades to rendering every time
//! - Concurrent requests for one card all succeed with identical bytes

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;

use cardgen::{create_router, CardService, RouterConfig};

use super::test_utils::{body_bytes, counting_router, get, is_valid_png, CountingRenderer, UnavailableStore};

// =============================================================================
// Server Cache
// =============================================================================

#[tokio::test]
async fn test_second_request_is_cache_hit() {
    let (router, renders) = counting_router(RouterConfig::new());

    let first = get(&router, "/card/15x10/", &[]).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers().get("x-card-cache-hit").unwrap(), "false");
    let first_body = body_bytes(first).await;

    let second = get(&router, "/card/15x10/", &[]).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers().get("x-card-cache-hit").unwrap(), "true");
    let second_body = body_bytes(second).await;

    assert_eq!(first_body, second_body);
    assert_eq!(renders.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_swapped_dimensions_cached_separately() {
    let (router, renders) = counting_router(RouterConfig::new());

    get(&router, "/card/15x10/", &[]).await;
    let swapped = get(&router, "/card/10x15/", &[]).await;

    assert_eq!(swapped.headers().get("x-card-cache-hit").unwrap(), "false");
    assert_eq!(renders.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalid_requests_never_render() {
    let (router, renders) = counting_router(RouterConfig::new());

    for uri in ["/card/0x10/", "/card/10x2048/", "/card/abcx1/"] {
        let response = get(&router, uri, &[]).await;
        assert_ne!(response.status(), StatusCode::OK);
    }

    assert_eq!(renders.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_many_sequential_requests_render_once() {
    let (router, renders) = counting_router(RouterConfig::new());

    for _ in 0..10 {
        let response = get(&router, "/card/100x100/", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(renders.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unbounded_ttl_still_serves_and_caches() {
    let service = CardService::in_memory().with_ttl(Duration::MAX);
    let router = create_router(service, RouterConfig::new().with_tracing(false));

    let first = get(&router, "/card/15x10/", &[]).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers().get("x-card-cache-hit").unwrap(), "false");
    assert_eq!(
        first.headers().get("cache-control").unwrap(),
        "public, max-age=31536000"
    );

    let second = get(&router, "/card/15x10/", &[]).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers().get("x-card-cache-hit").unwrap(), "true");
}

// =============================================================================
// Unavailable Cache Backend
// =============================================================================

#[tokio::test]
async fn test_unavailable_cache_still_serves_cards() {
    let renderer = CountingRenderer::new();
    let renders = renderer.counter();
    let store = Arc::new(UnavailableStore::default());
    let service = CardService::with_shared_store(renderer, Arc::clone(&store));
    let router = create_router(service, RouterConfig::new().with_tracing(false));

    for _ in 0..3 {
        let response = get(&router, "/card/15x10/", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-card-cache-hit").unwrap(), "false");
        assert!(is_valid_png(&body_bytes(response).await));
    }

    // Every request rendered, and every request tried the store twice
    assert_eq!(renders.load(Ordering::SeqCst), 3);
    assert_eq!(store.attempts.load(Ordering::SeqCst), 6);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_concurrent_requests_same_card() {
    let (router, renders) = counting_router(RouterConfig::new());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            let response = get(&router, "/card/256x256/", &[]).await;
            assert_eq!(response.status(), StatusCode::OK);
            body_bytes(response).await
        }));
    }

    let mut bodies = Vec::new();
    for handle in handles {
        bodies.push(handle.await.unwrap());
    }

    // Concurrent misses may each render, but never produce different bytes
    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
    let count = renders.load(Ordering::SeqCst);
    assert!((1..=8).contains(&count));

    // Once settled, the card is cached
    let response = get(&router, "/card/256x256/", &[]).await;
    assert_eq!(response.headers().get("x-card-cache-hit").unwrap(), "true");
}
