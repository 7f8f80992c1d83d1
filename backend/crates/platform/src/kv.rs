//! Key-Value Store Infrastructure
//!
//! Durable-ish per-key storage with TTL expiry. The gateway keeps every
//! piece of cross-request state (admin attempt counters, OAuth transients)
//! behind [`KvStore`], so handlers hold no shared mutable state of their own.
//!
//! Consistency contract: read-your-writes per key, nothing across keys.
//! There is no atomic increment; callers doing read-modify-write accept
//! that two concurrent writers may both observe the same prior value.
//! [`KvStore::take`] is the one atomic operation: of two concurrent takes on
//! a key, at most one sees the value.

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::SharedClock;

/// KV store errors
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// The backing store failed the operation
    #[error("KV backend error: {0}")]
    Backend(String),

    /// A stored value could not be (de)serialized
    #[error("KV serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type KvResult<T> = Result<T, KvError>;

/// Trait for key-value storage backends
#[trait_variant::make(KvStore: Send)]
pub trait LocalKvStore {
    /// Get a live value; expired entries read as absent
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Put a value that expires after `ttl`
    async fn put(&self, key: &str, value: String, ttl: Duration) -> KvResult<()>;

    /// Delete a value (no-op if absent)
    async fn delete(&self, key: &str) -> KvResult<()>;

    /// Remove a value and return it if it was live
    async fn take(&self, key: &str) -> KvResult<Option<String>>;
}

/// Read and decode a JSON value
pub async fn get_json<S, T>(store: &S, key: &str) -> KvResult<Option<T>>
where
    S: KvStore,
    T: DeserializeOwned,
{
    match KvStore::get(store, key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value with a TTL
pub async fn put_json<S, T>(store: &S, key: &str, value: &T, ttl: Duration) -> KvResult<()>
where
    S: KvStore,
    T: Serialize,
{
    let raw = serde_json::to_string(value)?;
    KvStore::put(store, key, raw, ttl).await
}

/// Remove and decode a JSON value
pub async fn take_json<S, T>(store: &S, key: &str) -> KvResult<Option<T>>
where
    S: KvStore,
    T: DeserializeOwned,
{
    match KvStore::take(store, key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at_ms: i64,
}

/// Per-instance in-memory store
///
/// Used when no shared store is bound and in tests. State is lost on
/// restart and is not shared between gateway instances.
#[derive(Clone)]
pub struct MemoryKvStore {
    entries: Arc<DashMap<String, Entry>>,
    clock: SharedClock,
}

impl MemoryKvStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, including not-yet-purged expired ones
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now_ms = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at_ms > now_ms);
        before.saturating_sub(self.entries.len())
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let now_ms = self.clock.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at_ms > now_ms => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries
                .remove_if(key, |_, entry| entry.expires_at_ms <= now_ms);
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> KvResult<()> {
        let expires_at_ms = self.clock.now_ms() + ttl.as_millis() as i64;
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at_ms,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> KvResult<Option<String>> {
        let now_ms = self.clock.now_ms();
        Ok(self
            .entries
            .remove(key)
            .filter(|(_, entry)| entry.expires_at_ms > now_ms)
            .map(|(_, entry)| entry.value))
    }
}

// ============================================================================
// No-op backend
// ============================================================================

/// Store used when the KV binding is absent
///
/// Reads are always empty and writes are discarded, so every request looks
/// like a first visit. Admission keeps working (degraded) instead of failing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopKvStore;

impl KvStore for NoopKvStore {
    async fn get(&self, _key: &str) -> KvResult<Option<String>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> KvResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> KvResult<()> {
        Ok(())
    }

    async fn take(&self, _key: &str) -> KvResult<Option<String>> {
        Ok(None)
    }
}

// ============================================================================
// Binding selection
// ============================================================================

/// Which store backs the `KV_BINDING` setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KvBindingKind {
    #[default]
    Memory,
    None,
}

impl FromStr for KvBindingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "" => Ok(KvBindingKind::Memory),
            "none" | "off" | "disabled" => Ok(KvBindingKind::None),
            other => Err(format!("unknown KV binding: {other}")),
        }
    }
}

/// Store selected at startup
#[derive(Clone)]
pub enum KvBinding {
    Memory(MemoryKvStore),
    Disabled(NoopKvStore),
}

impl KvBinding {
    pub fn from_kind(kind: KvBindingKind, clock: SharedClock) -> Self {
        match kind {
            KvBindingKind::Memory => KvBinding::Memory(MemoryKvStore::new(clock)),
            KvBindingKind::None => {
                tracing::warn!("No KV binding configured, counters and OAuth state are disabled");
                KvBinding::Disabled(NoopKvStore)
            }
        }
    }

    pub fn purge_expired(&self) -> usize {
        match self {
            KvBinding::Memory(store) => store.purge_expired(),
            KvBinding::Disabled(_) => 0,
        }
    }
}

impl KvStore for KvBinding {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        match self {
            KvBinding::Memory(store) => KvStore::get(store, key).await,
            KvBinding::Disabled(store) => KvStore::get(store, key).await,
        }
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> KvResult<()> {
        match self {
            KvBinding::Memory(store) => KvStore::put(store, key, value, ttl).await,
            KvBinding::Disabled(store) => KvStore::put(store, key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        match self {
            KvBinding::Memory(store) => KvStore::delete(store, key).await,
            KvBinding::Disabled(store) => KvStore::delete(store, key).await,
        }
    }

    async fn take(&self, key: &str) -> KvResult<Option<String>> {
        match self {
            KvBinding::Memory(store) => KvStore::take(store, key).await,
            KvBinding::Disabled(store) => KvStore::take(store, key).await,
        }
    }
}
