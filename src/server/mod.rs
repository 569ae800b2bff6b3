//! HTTP server layer for the card generator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │               GET /card/{height}x{width}/                       │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │ conditional │  │        routes           │  │
//! │  │ (requests)  │  │ (ETag/304)  │  │  (router + middleware)  │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! │  ┌─────────────┐  ┌─────────────┐                               │
//! │  │    hosts    │  │    home     │                               │
//! │  │ (Host check)│  │ (homepage)  │                               │
//! │  └─────────────┘  └─────────────┘                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod conditional;
pub mod handlers;
pub mod home;
pub mod hosts;
pub mod routes;

pub use conditional::{conditional_get, if_none_match};
pub use handlers::{
    append_slash_handler, card_handler, health_handler, index_handler, AppState, CardPathParams,
    HandlerError, HealthResponse, CACHE_HIT_HEADER, INVALID_CARD_BODY,
};
pub use home::render_homepage;
pub use hosts::{allowed_hosts_middleware, AllowedHosts};
pub use routes::{create_router, RouterConfig};
