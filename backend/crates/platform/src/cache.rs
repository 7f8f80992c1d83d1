//! Edge Cache Infrastructure
//!
//! A response cache keyed by synthetic URL. Entries carry a `Cache-Control`
//! header and disappear on their own once `max-age` elapses; there is no
//! bulk delete. The cache is best-effort: an entry may be evicted before its
//! `max-age` (memory pressure), but it is never served after it.

use dashmap::DashMap;
use std::sync::Arc;

use crate::clock::SharedClock;

/// Edge cache errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache backend failed the operation
    #[error("Cache backend error: {0}")]
    Backend(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Cached response body with its caching directives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub body: String,
    pub cache_control: String,
}

impl CacheEntry {
    /// Entry cacheable for `max_age_secs`
    pub fn with_max_age(body: impl Into<String>, max_age_secs: u64) -> Self {
        Self {
            body: body.into(),
            cache_control: format!("max-age={}", max_age_secs),
        }
    }

    /// `max-age` from the entry's `Cache-Control`, if cacheable
    pub fn max_age_secs(&self) -> Option<u64> {
        parse_max_age(&self.cache_control)
    }
}

/// Parse `max-age` out of a `Cache-Control` value
///
/// `no-store` and `no-cache` make the entry uncacheable.
pub fn parse_max_age(cache_control: &str) -> Option<u64> {
    let mut max_age = None;
    for directive in cache_control.split(',').map(str::trim) {
        let lower = directive.to_ascii_lowercase();
        if lower == "no-store" || lower == "no-cache" {
            return None;
        }
        if let Some(value) = lower.strip_prefix("max-age=") {
            max_age = value.trim_matches('"').parse().ok();
        }
    }
    max_age
}

/// Trait for edge cache backends
#[trait_variant::make(EdgeCache: Send)]
pub trait LocalEdgeCache {
    /// Look up a live entry by URL
    async fn lookup(&self, url: &str) -> CacheResult<Option<CacheEntry>>;

    /// Store an entry; entries without a positive `max-age` are ignored
    async fn put(&self, url: &str, entry: CacheEntry) -> CacheResult<()>;
}

#[derive(Debug, Clone)]
struct Slot {
    entry: CacheEntry,
    expires_at_ms: i64,
}

/// Per-instance in-memory edge cache
///
/// With a capacity set, inserting into a full cache evicts the entry closest
/// to expiry, which models early eviction under memory pressure.
#[derive(Clone)]
pub struct MemoryEdgeCache {
    slots: Arc<DashMap<String, Slot>>,
    clock: SharedClock,
    capacity: Option<usize>,
}

impl MemoryEdgeCache {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            clock,
            capacity: None,
        }
    }

    pub fn with_capacity(clock: SharedClock, capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::new(clock)
        }
    }

    /// Evict an entry before it expires
    pub fn evict(&self, url: &str) -> bool {
        self.slots.remove(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop expired entries; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.expires_at_ms > now_ms);
        before.saturating_sub(self.slots.len())
    }

    fn make_room(&self, incoming: &str) {
        let Some(capacity) = self.capacity else {
            return;
        };
        if self.slots.len() < capacity || self.slots.contains_key(incoming) {
            return;
        }

        self.purge_expired();
        if self.slots.len() < capacity {
            return;
        }

        let victim = self
            .slots
            .iter()
            .min_by_key(|slot| slot.expires_at_ms)
            .map(|slot| slot.key().clone());
        if let Some(url) = victim {
            tracing::debug!(url = %url, "Edge cache full, evicting early");
            self.evict(&url);
        }
    }
}

impl EdgeCache for MemoryEdgeCache {
    async fn lookup(&self, url: &str) -> CacheResult<Option<CacheEntry>> {
        let now_ms = self.clock.now_ms();

        let expired = match self.slots.get(url) {
            Some(slot) if slot.expires_at_ms > now_ms => return Ok(Some(slot.entry.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.slots
                .remove_if(url, |_, slot| slot.expires_at_ms <= now_ms);
        }
        Ok(None)
    }

    async fn put(&self, url: &str, entry: CacheEntry) -> CacheResult<()> {
        let Some(max_age) = entry.max_age_secs().filter(|secs| *secs > 0) else {
            tracing::debug!(url = %url, "Entry is not cacheable, skipping");
            return Ok(());
        };

        self.make_room(url);

        let expires_at_ms = self.clock.now_ms() + (max_age as i64) * 1000;
        self.slots.insert(
            url.to_string(),
            Slot {
                entry,
                expires_at_ms,
            },
        );
        Ok(())
    }
}
