//! Repository Traits
//!
//! Interfaces for admission state. Implementation is in infrastructure layer.

use crate::domain::entities::{AttemptRecord, WindowCounter};
use crate::domain::value_objects::WindowObservation;
use crate::error::AdmissionResult;
use platform::client::ClientIdentity;
use std::time::Duration;

/// Admin-portal attempt repository trait
#[trait_variant::make(AttemptRepository: Send)]
pub trait LocalAttemptRepository {
    /// Load the attempt record for an identity
    async fn load_attempts(&self, identity: &ClientIdentity) -> AdmissionResult<Option<AttemptRecord>>;

    /// Store the attempt record, replacing any previous one
    async fn save_attempts(
        &self,
        identity: &ClientIdentity,
        record: &AttemptRecord,
        ttl: Duration,
    ) -> AdmissionResult<()>;
}

/// Flash-sale window counter repository trait
#[trait_variant::make(WindowCounterRepository: Send)]
pub trait LocalWindowCounterRepository {
    /// Read the live counter for an identity
    async fn observe_window(&self, identity: &ClientIdentity) -> AdmissionResult<WindowObservation>;

    /// Write the counter; it lives for `window`
    async fn record_window(
        &self,
        identity: &ClientIdentity,
        counter: WindowCounter,
        window: Duration,
    ) -> AdmissionResult<()>;
}
