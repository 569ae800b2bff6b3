//! Allowed hosts and response header integration tests.
//!
//! Tests verify:
//! - Requests for unlisted hosts are rejected with 400
//! - Subdomain patterns and ports are handled
//! - Every response carries X-Frame-Options

use axum::http::StatusCode;

use cardgen::{create_router, AllowedHosts, CardService, RouterConfig};

use super::test_utils::{body_bytes, default_router, get};

fn restricted_router() -> axum::Router {
    create_router(
        CardService::in_memory(),
        RouterConfig::new()
            .with_allowed_hosts(AllowedHosts::new(["localhost", ".cards.test"]))
            .with_tracing(false),
    )
}

#[tokio::test]
async fn test_allowed_host_served() {
    let router = restricted_router();

    for host in ["localhost", "localhost:8000", "cards.test", "img.cards.test"] {
        let response = get(&router, "/card/15x10/", &[("host", host)]).await;
        assert_eq!(response.status(), StatusCode::OK, "host {}", host);
    }
}

#[tokio::test]
async fn test_disallowed_host_rejected() {
    let router = restricted_router();

    for host in ["evil.test", "cards.test.evil.test", "notcards.test"] {
        let response = get(&router, "/card/15x10/", &[("host", host)]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "host {}", host);

        let body = body_bytes(response).await;
        assert_eq!(&body[..], b"Bad Request (400)");
    }
}

#[tokio::test]
async fn test_missing_host_rejected_when_restricted() {
    let router = restricted_router();

    let response = get(&router, "/", &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wildcard_allows_any_host() {
    let router = default_router();

    let response = get(&router, "/health", &[("host", "anything.example")]).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_frame_options_on_every_response() {
    let router = restricted_router();

    for (uri, host) in [
        ("/card/15x10/", "localhost"),
        ("/card/0x10/", "localhost"),
        ("/", "localhost"),
        ("/missing", "localhost"),
        ("/card/15x10/", "evil.test"),
    ] {
        let response = get(&router, uri, &[("host", host)]).await;
        assert_eq!(
            response.headers().get("x-frame-options").unwrap(),
            "SAMEORIGIN",
            "uri {} host {}",
            uri,
            host
        );
    }
}
