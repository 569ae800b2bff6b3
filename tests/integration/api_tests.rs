//! API integration tests for card retrieval and error handling.
//!
//! Tests verify:
//! - Card retrieval and decoded dimensions
//! - Validation failures (400) and unmatched paths (404)
//! - Append-slash redirect
//! - Homepage and health endpoints

use axum::http::StatusCode;

use cardgen::{create_router, CardService, MemoryCardStore, RouterConfig};

use super::test_utils::{body_bytes, decode_image, default_router, get, is_valid_png, FailingRenderer};

// =============================================================================
// Card Retrieval
// =============================================================================

#[tokio::test]
async fn test_card_retrieval_success() {
    let router = default_router();

    let response = get(&router, "/card/15x10/", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=3600"
    );
    assert!(response.headers().contains_key("etag"));

    let body = body_bytes(response).await;
    assert!(is_valid_png(&body), "Response should be a valid PNG");

    // Height comes first in the path
    let image = decode_image(&body);
    assert_eq!(image.width(), 10);
    assert_eq!(image.height(), 15);
}

#[tokio::test]
async fn test_card_bounds_inclusive() {
    let router = default_router();

    for uri in ["/card/1x1/", "/card/1024x1024/", "/card/1x1024/"] {
        let response = get(&router, uri, &[]).await;
        assert_eq!(response.status(), StatusCode::OK, "uri {}", uri);
    }
}

#[tokio::test]
async fn test_large_card_dimensions() {
    let router = default_router();

    let response = get(&router, "/card/200x320/", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let image = decode_image(&body_bytes(response).await);
    assert_eq!((image.width(), image.height()), (320, 200));
}

#[tokio::test]
async fn test_leading_zeros_accepted() {
    let router = default_router();

    let response = get(&router, "/card/015x010/", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let image = decode_image(&body_bytes(response).await);
    assert_eq!((image.width(), image.height()), (10, 15));
}

#[tokio::test]
async fn test_responses_are_identical() {
    let router = default_router();

    let first = body_bytes(get(&router, "/card/64x64/", &[]).await).await;
    let second = body_bytes(get(&router, "/card/64x64/", &[]).await).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_custom_cache_max_age() {
    let router = create_router(
        CardService::in_memory(),
        RouterConfig::new().with_cache_max_age(60).with_tracing(false),
    );

    let response = get(&router, "/card/10x10/", &[]).await;
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=60"
    );
}

// =============================================================================
// Validation Errors
// =============================================================================

#[tokio::test]
async fn test_zero_dimension_rejected() {
    let router = default_router();

    for uri in ["/card/0x10/", "/card/10x0/", "/card/0x0/"] {
        let response = get(&router, uri, &[]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {}", uri);
        assert!(!response.headers().contains_key("etag"));

        let body = body_bytes(response).await;
        assert_eq!(&body[..], b"Invalid Card Request");
    }
}

#[tokio::test]
async fn test_oversized_dimension_rejected() {
    let router = default_router();

    for uri in ["/card/1025x10/", "/card/10x1025/", "/card/99999999999999999999x10/"] {
        let response = get(&router, uri, &[]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {}", uri);
        let body = body_bytes(response).await;
        assert_eq!(&body[..], b"Invalid Card Request");
    }
}

#[tokio::test]
async fn test_non_numeric_path_not_found() {
    let router = default_router();

    for uri in ["/card/-1x10/", "/card/abcx10/", "/card/15/", "/card/15x10x5/", "/card/15X10/"] {
        let response = get(&router, uri, &[]).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {}", uri);
    }
}

#[tokio::test]
async fn test_render_failure_is_server_error() {
    let router = create_router(
        CardService::new(FailingRenderer, MemoryCardStore::new()),
        RouterConfig::new().with_tracing(false),
    );

    let response = get(&router, "/card/15x10/", &[]).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.headers().contains_key("etag"));

    let body = body_bytes(response).await;
    assert_eq!(&body[..], b"Internal Server Error");
}

#[tokio::test]
async fn test_render_failure_details_in_debug_mode() {
    let router = create_router(
        CardService::new(FailingRenderer, MemoryCardStore::new()),
        RouterConfig::new().with_debug(true).with_tracing(false),
    );

    let response = get(&router, "/card/15x10/", &[]).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(body.contains("encoder unavailable"));
}

// =============================================================================
// Append Slash
// =============================================================================

#[tokio::test]
async fn test_missing_trailing_slash_redirects() {
    let router = default_router();

    let response = get(&router, "/card/15x10", &[]).await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers().get("location").unwrap(), "/card/15x10/");
}

#[tokio::test]
async fn test_redirect_keeps_query() {
    let router = default_router();

    let response = get(&router, "/card/15x10?v=2", &[]).await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/card/15x10/?v=2"
    );
}

#[tokio::test]
async fn test_no_redirect_for_non_card_path() {
    let router = default_router();

    let response = get(&router, "/card/abc", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Homepage and Health
// =============================================================================

#[tokio::test]
async fn test_homepage_lists_absolute_links() {
    let router = default_router();

    let response = get(&router, "/", &[("host", "cards.test:8000")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(body.contains("http://cards.test:8000/card/320x200/"));
    assert!(body.contains("Showcase"));
}

#[tokio::test]
async fn test_homepage_without_showcase() {
    let router = create_router(
        CardService::in_memory(),
        RouterConfig::new().with_showcase(false).with_tracing(false),
    );

    let response = get(&router, "/", &[("host", "cards.test")]).await;
    let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(body.contains("http://cards.test/card/320x200/"));
    assert!(!body.contains("Showcase"));
}

#[tokio::test]
async fn test_homepage_links_resolve() {
    let router = default_router();

    let response = get(&router, "/", &[("host", "cards.test")]).await;
    let body = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();

    // Every linked card must be servable
    for link in body
        .split("href=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
    {
        let path = link.trim_start_matches("http://cards.test");
        let response = get(&router, path, &[]).await;
        assert_eq!(response.status(), StatusCode::OK, "link {}", link);
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = default_router();

    let response = get(&router, "/health", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await;
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
}
