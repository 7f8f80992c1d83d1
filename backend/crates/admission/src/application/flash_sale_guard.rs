//! Flash Sale Guard Use Case

use crate::application::config::AdmissionConfig;
use crate::domain::entities::WindowCounter;
use crate::domain::repository::WindowCounterRepository;
use crate::domain::services::decide_flash_sale;
use crate::domain::value_objects::FlashSaleDecision;
use crate::error::AdmissionResult;
use platform::client::ClientIdentity;
use platform::clock::SharedClock;
use platform::tasks::BackgroundTasks;
use std::sync::Arc;

/// Flash Sale Guard Use Case
///
/// A denied request leaves the stored counter untouched, so the window is
/// not extended by retries. An admitted request writes the bumped counter in
/// a tracked background task and does not wait for it.
pub struct FlashSaleGuardUseCase<R>
where
    R: WindowCounterRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
    config: Arc<AdmissionConfig>,
    clock: SharedClock,
    tasks: BackgroundTasks,
}

impl<R> FlashSaleGuardUseCase<R>
where
    R: WindowCounterRepository + Send + Sync + 'static,
{
    pub fn new(
        repo: Arc<R>,
        config: Arc<AdmissionConfig>,
        clock: SharedClock,
        tasks: BackgroundTasks,
    ) -> Self {
        Self {
            repo,
            config,
            clock,
            tasks,
        }
    }

    pub async fn execute(&self, identity: &ClientIdentity) -> AdmissionResult<FlashSaleDecision> {
        let observation = self.repo.observe_window(identity).await?;
        let rate_limit = &self.config.flash_sale_rate_limit;
        let decision = decide_flash_sale(observation, rate_limit);

        match decision {
            FlashSaleDecision::Block { request_count, .. } => {
                tracing::warn!(
                    client_ip = %identity,
                    request_count,
                    limit = rate_limit.max_requests,
                    "Flash sale rate limited"
                );
            }
            FlashSaleDecision::Allow { request_count, .. } => {
                tracing::info!(client_ip = %identity, request_count, "Flash sale access granted");

                let counter = WindowCounter::new(request_count, self.clock.now_ms());
                let repo = self.repo.clone();
                let identity = identity.clone();
                let window = rate_limit.window;
                self.tasks.spawn("flash_sale_counter", async move {
                    repo.record_window(&identity, counter, window).await
                });
            }
        }

        Ok(decision)
    }
}
