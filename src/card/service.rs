//! Card Service for orchestrating card generation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         CardService                              │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                    get_card()                           │    │
//! │  │  1. Build cache key   3. Render on a blocking thread    │    │
//! │  │  2. Check store       4. Store & return                 │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │                 │                          │                     │
//! │                 ▼                          ▼                     │
//! │         ┌──────────────┐          ┌──────────────────┐           │
//! │         │  CardStore   │          │      Render      │           │
//! │         └──────────────┘          └──────────────────┘           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Requests arrive already validated, so nothing invalid ever reaches the
//! store. Store failures are logged and degrade to a cache miss.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use super::cache::{CardCacheKey, CardStore, MemoryCardStore, DEFAULT_CACHE_TTL};
use super::renderer::{CardFormat, CardRenderer, Render};
use super::request::CardRequest;
use crate::error::CardError;

// =============================================================================
// Card Response
// =============================================================================

/// Response from the card service.
#[derive(Debug, Clone)]
pub struct CardResponse {
    /// The encoded card
    pub data: Bytes,

    /// Whether the card was served from the store
    pub cache_hit: bool,

    /// Format the card is encoded in
    pub format: CardFormat,
}

// =============================================================================
// Card Service
// =============================================================================

/// Service for generating and caching cards.
///
/// # Example
///
/// ```
/// use cardgen::card::{CardFormat, CardRequest, CardService};
///
/// #[tokio::main]
/// async fn main() {
///     let service = CardService::in_memory();
///     let request = CardRequest::new(200, 320).unwrap();
///
///     let first = service.get_card(request, CardFormat::Png).await.unwrap();
///     let second = service.get_card(request, CardFormat::Png).await.unwrap();
///
///     assert!(!first.cache_hit);
///     assert!(second.cache_hit);
///     assert_eq!(first.data, second.data);
/// }
/// ```
pub struct CardService<R: Render, C: CardStore> {
    renderer: Arc<R>,
    store: Arc<C>,
    ttl: Duration,
}

impl CardService<CardRenderer, MemoryCardStore> {
    /// Default renderer backed by an in-process store of default capacity.
    pub fn in_memory() -> Self {
        Self::new(CardRenderer::new(), MemoryCardStore::new())
    }
}

impl<R: Render, C: CardStore> CardService<R, C> {
    /// Create a service with the default 1 hour TTL.
    pub fn new(renderer: R, store: C) -> Self {
        Self::with_shared_store(renderer, Arc::new(store))
    }

    /// Create a service around a store that is shared with other components,
    /// such as the expiry sweeper.
    pub fn with_shared_store(renderer: R, store: Arc<C>) -> Self {
        Self {
            renderer: Arc::new(renderer),
            store,
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Set how long rendered cards stay in the store.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &Arc<C> {
        &self.store
    }

    /// Get a card, using the store when possible.
    ///
    /// # Errors
    ///
    /// Returns an error only if rendering or encoding fails. Store errors
    /// never fail the request.
    pub async fn get_card(
        &self,
        request: CardRequest,
        format: CardFormat,
    ) -> Result<CardResponse, CardError> {
        let key = CardCacheKey::new(request.width(), request.height(), format);

        match self.store.get(&key).await {
            Ok(Some(data)) => {
                debug!(key = %key, "Card cache hit");
                return Ok(CardResponse {
                    data,
                    cache_hit: true,
                    format,
                });
            }
            Ok(None) => debug!(key = %key, "Card cache miss"),
            Err(e) => warn!(key = %key, "Card cache read failed, rendering instead: {}", e),
        }

        let data = self.render(request, format).await?;

        if let Err(e) = self.store.set(key.clone(), data.clone(), self.ttl).await {
            warn!(key = %key, "Card cache write failed: {}", e);
        }

        Ok(CardResponse {
            data,
            cache_hit: false,
            format,
        })
    }

    /// Render a card without touching the store.
    pub async fn render(&self, request: CardRequest, format: CardFormat) -> Result<Bytes, CardError> {
        let renderer = Arc::clone(&self.renderer);

        tokio::task::spawn_blocking(move || renderer.render(&request, format))
            .await
            .map_err(|e| CardError::Render {
                message: e.to_string(),
            })?
    }
}

// =============================================================================
// Tests
// =============================================================================
