//! Edge storage implementation of the admission repositories
//!
//! Attempt records live in the KV store; window counters live in the edge
//! cache, where `max-age` expiry is what closes a window.

use crate::application::config::AdmissionConfig;
use crate::domain::entities::{AttemptRecord, WindowCounter};
use crate::domain::repository::{AttemptRepository, WindowCounterRepository};
use crate::domain::value_objects::WindowObservation;
use crate::error::AdmissionResult;
use platform::cache::{CacheEntry, EdgeCache};
use platform::client::ClientIdentity;
use platform::kv::{KvStore, get_json, put_json};
use std::sync::Arc;
use std::time::Duration;

/// KV key prefix for admin attempt records
pub const ATTEMPT_KEY_PREFIX: &str = "admin_attempts_";

/// Repository over a KV store and an edge cache
#[derive(Clone)]
pub struct EdgeAdmissionRepository<S, C>
where
    S: KvStore + Clone,
    C: EdgeCache + Clone,
{
    kv: S,
    cache: C,
    config: Arc<AdmissionConfig>,
}

impl<S, C> EdgeAdmissionRepository<S, C>
where
    S: KvStore + Clone,
    C: EdgeCache + Clone,
{
    pub fn new(kv: S, cache: C, config: Arc<AdmissionConfig>) -> Self {
        Self { kv, cache, config }
    }

    fn attempt_key(identity: &ClientIdentity) -> String {
        format!("{}{}", ATTEMPT_KEY_PREFIX, identity)
    }
}

impl<S, C> AttemptRepository for EdgeAdmissionRepository<S, C>
where
    S: KvStore + Clone + Sync,
    C: EdgeCache + Clone + Sync,
{
    async fn load_attempts(&self, identity: &ClientIdentity) -> AdmissionResult<Option<AttemptRecord>> {
        let record = get_json(&self.kv, &Self::attempt_key(identity)).await?;
        Ok(record)
    }

    async fn save_attempts(
        &self,
        identity: &ClientIdentity,
        record: &AttemptRecord,
        ttl: Duration,
    ) -> AdmissionResult<()> {
        put_json(&self.kv, &Self::attempt_key(identity), record, ttl).await?;
        Ok(())
    }
}

impl<S, C> WindowCounterRepository for EdgeAdmissionRepository<S, C>
where
    S: KvStore + Clone + Sync,
    C: EdgeCache + Clone + Sync,
{
    async fn observe_window(&self, identity: &ClientIdentity) -> AdmissionResult<WindowObservation> {
        let url = self.config.window_cache_url(identity.as_str());

        let observation = match self.cache.lookup(&url).await? {
            None => WindowObservation::Absent,
            Some(entry) => match WindowCounter::parse(&entry.body) {
                Some(counter) => WindowObservation::Counter(counter.count),
                None => {
                    tracing::debug!(url = %url, "Unreadable window counter");
                    WindowObservation::Unreadable
                }
            },
        };
        Ok(observation)
    }

    async fn record_window(
        &self,
        identity: &ClientIdentity,
        counter: WindowCounter,
        window: Duration,
    ) -> AdmissionResult<()> {
        let url = self.config.window_cache_url(identity.as_str());
        let entry = CacheEntry::with_max_age(counter.to_body(), window.as_secs());
        self.cache.put(&url, entry).await?;
        Ok(())
    }
}
