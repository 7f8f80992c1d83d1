//! Admin Portal Guard Use Case

use crate::domain::repository::AttemptRepository;
use crate::domain::services::{ATTEMPT_RECORD_TTL, decide_admin, next_attempt};
use crate::domain::value_objects::AdminDecision;
use crate::error::AdmissionResult;
use platform::client::ClientIdentity;
use platform::clock::SharedClock;
use std::sync::Arc;

/// Admin Portal Guard Use Case
///
/// Read, bump and write back the attempt record, then decide. The
/// read-modify-write is not atomic: concurrent requests from one identity may
/// both read the same count.
pub struct AdminGuardUseCase<R>
where
    R: AttemptRepository,
{
    repo: Arc<R>,
    clock: SharedClock,
}

impl<R> AdminGuardUseCase<R>
where
    R: AttemptRepository,
{
    pub fn new(repo: Arc<R>, clock: SharedClock) -> Self {
        Self { repo, clock }
    }

    pub async fn execute(
        &self,
        identity: &ClientIdentity,
        user_agent: &str,
    ) -> AdmissionResult<AdminDecision> {
        let previous = self.repo.load_attempts(identity).await?;
        let record = next_attempt(previous.as_ref(), self.clock.now_ms(), user_agent);

        self.repo
            .save_attempts(identity, &record, ATTEMPT_RECORD_TTL)
            .await?;

        tracing::info!(
            client_ip = %identity,
            attempts = record.attempts,
            user_agent = %user_agent,
            "Admin portal access"
        );

        let decision = decide_admin(record.attempts);
        if decision.is_blocked() {
            tracing::warn!(
                client_ip = %identity,
                attempts = record.attempts,
                "Blocking admin portal access"
            );
        }

        Ok(decision)
    }
}
