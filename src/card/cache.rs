//! Server-side cache for encoded cards.
//!
//! Cards are cached by a string key built from width, height and format.
//! Every entry carries its own expiry; expired entries read as absent and are
//! dropped the next time they are touched or when the sweeper runs.
//!
//! The store is reached through the [`CardStore`] trait so the card service
//! can treat a broken backend as a cache miss instead of failing the request.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::renderer::CardFormat;
use crate::error::CacheError;

/// Default time-to-live of a cached card: 1 hour.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Longest time a card may stay cached: 1 year. Longer TTLs are clamped.
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Default cache capacity: 64MB
pub const DEFAULT_CARD_CACHE_CAPACITY: usize = 64 * 1024 * 1024;

/// Default maximum number of entries (to bound LRU overhead)
const DEFAULT_MAX_ENTRIES: usize = 10_000;

// =============================================================================
// Cache Key
// =============================================================================

/// Cache key for an encoded card, `card:{width}x{height}:{format}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardCacheKey(String);

impl CardCacheKey {
    pub fn new(width: u32, height: u32, format: CardFormat) -> Self {
        Self(format!("card:{}x{}:{}", width, height, format.token()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Store Trait
// =============================================================================

/// Key to bytes store with per-entry expiry.
///
/// Implementations must be safe to call from concurrent requests.
#[async_trait]
pub trait CardStore: Send + Sync + 'static {
    /// Fetch a live entry. Expired entries are reported as `None`.
    async fn get(&self, key: &CardCacheKey) -> Result<Option<Bytes>, CacheError>;

    /// Store `data` under `key` for `ttl`, replacing any previous entry.
    async fn set(&self, key: CardCacheKey, data: Bytes, ttl: Duration) -> Result<(), CacheError>;
}

// =============================================================================
// Memory Store
// =============================================================================

#[derive(Debug, Clone)]
struct CachedCard {
    data: Bytes,
    expires_at: Instant,
}

impl CachedCard {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

struct Inner {
    entries: LruCache<CardCacheKey, CachedCard>,
    current_size: usize,
}

impl Inner {
    fn pop(&mut self, key: &CardCacheKey) -> Option<CachedCard> {
        let entry = self.entries.pop(key)?;
        self.current_size = self.current_size.saturating_sub(entry.data.len());
        Some(entry)
    }
}

/// In-process LRU card store with a byte capacity.
///
/// When an insert pushes the total size of cached cards over capacity, the
/// least recently used entries are evicted until it fits again.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use bytes::Bytes;
/// use cardgen::card::{CardCacheKey, CardFormat, CardStore, MemoryCardStore};
///
/// #[tokio::main]
/// async fn main() {
///     let store = MemoryCardStore::new();
///     let key = CardCacheKey::new(320, 200, CardFormat::Png);
///
///     store.set(key.clone(), Bytes::from_static(b"png"), Duration::from_secs(60)).await.unwrap();
///     assert_eq!(store.get(&key).await.unwrap(), Some(Bytes::from_static(b"png")));
/// }
/// ```
pub struct MemoryCardStore {
    inner: RwLock<Inner>,
    max_size: usize,
}

impl MemoryCardStore {
    /// Create a store with the default capacity (64MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CARD_CACHE_CAPACITY)
    }

    /// Create a store holding at most `max_size` bytes of card data.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a store bounded by both total bytes and entry count.
    ///
    /// An entry count of zero is treated as one.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        let max_entries = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: RwLock::new(Inner {
                entries: LruCache::new(max_entries),
                current_size: 0,
            }),
            max_size,
        }
    }

    /// Check for a live entry without updating LRU order.
    pub async fn contains(&self, key: &CardCacheKey) -> bool {
        let inner = self.inner.read().await;
        inner
            .entries
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(Instant::now()))
    }

    /// Remove an entry, returning its data if it was present.
    pub async fn remove(&self, key: &CardCacheKey) -> Option<Bytes> {
        let mut inner = self.inner.write().await;
        inner.pop(key).map(|entry| entry.data)
    }

    /// Drop every expired entry and return how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.write().await;

        let expired: Vec<CardCacheKey> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.pop(key);
        }

        expired.len()
    }

    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.current_size = 0;
    }

    /// Number of entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    /// Total size of cached card data in bytes.
    pub async fn size(&self) -> usize {
        self.inner.read().await.current_size
    }

    /// Maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for MemoryCardStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CardStore for MemoryCardStore {
    async fn get(&self, key: &CardCacheKey) -> Result<Option<Bytes>, CacheError> {
        let mut inner = self.inner.write().await;

        match inner.entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(Instant::now()) => {
                return Ok(Some(entry.data.clone()))
            }
            Some(_) => {}
        }

        debug!(key = %key, "Dropping expired card");
        inner.pop(key);
        Ok(None)
    }

    async fn set(&self, key: CardCacheKey, data: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let data_size = data.len();
        let mut inner = self.inner.write().await;

        // If key exists, subtract old size first
        if let Some(old) = inner.entries.peek(&key) {
            inner.current_size = inner.current_size.saturating_sub(old.data.len());
        }

        let now = Instant::now();
        let entry = CachedCard {
            data,
            expires_at: now
                .checked_add(ttl.min(MAX_CACHE_TTL))
                .unwrap_or(now),
        };

        // A full entry-count LRU pushes out its oldest entry on insert
        if let Some((evicted_key, evicted)) = inner.entries.push(key.clone(), entry) {
            if evicted_key != key {
                inner.current_size = inner.current_size.saturating_sub(evicted.data.len());
            }
        }
        inner.current_size += data_size;

        while inner.current_size > self.max_size {
            match inner.entries.pop_lru() {
                Some((_, evicted)) => {
                    inner.current_size = inner.current_size.saturating_sub(evicted.data.len());
                }
                None => break,
            }
        }

        Ok(())
    }
}

// =============================================================================
// Expiry Sweeper
// =============================================================================

/// Periodically purge expired cards from `store`.
///
/// Abort the returned handle to stop the sweeper.
pub fn spawn_expiry_sweeper(store: Arc<MemoryCardStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting card cache sweeper every {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.purge_expired().await;
            if removed > 0 {
                info!("Card cache sweep removed {} expired entries", removed);
            } else {
                debug!("Card cache sweep found no expired entries");
            }
        }
    })
}

// =============================================================================
// Tests
// =============================================================================
