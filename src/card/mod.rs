//! Card generation layer.
//!
//! This module turns validated dimensions into encoded placeholder images and
//! keeps recently rendered cards in a server-side store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │  validate_card_request()
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              Card Service               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  CardStore   │  │  CardRenderer   │  │
//! │  │  (encoded    │  │  (fill → label  │  │
//! │  │   cards)     │  │   → encode)     │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`validate_card_request`]: Parses and bounds-checks raw dimensions
//! - [`CardRenderer`]: Draws the card and encodes it
//! - [`CardStore`] / [`MemoryCardStore`]: Key to bytes store with expiry
//! - [`CardCacheKey`]: Store key built from width, height and format
//! - [`card_etag`]: Entity tag for conditional GET
//! - [`CardService`]: Store lookup, render on miss, store population

mod cache;
mod etag;
pub mod font;
mod renderer;
mod request;
mod service;

pub use cache::{
    spawn_expiry_sweeper, CardCacheKey, CardStore, MemoryCardStore, DEFAULT_CACHE_TTL,
    DEFAULT_CARD_CACHE_CAPACITY, MAX_CACHE_TTL,
};
pub use etag::{card_etag, quoted_card_etag};
pub use renderer::{
    CardFormat, CardRenderer, Render, DEFAULT_BACKGROUND, DEFAULT_FOREGROUND, DEFAULT_JPEG_QUALITY,
};
pub use request::{validate_card_request, CardRequest, MAX_DIMENSION, MIN_DIMENSION};
pub use service::{CardResponse, CardService};
