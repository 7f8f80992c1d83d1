//! Admission Router

use crate::application::config::AdmissionConfig;
use crate::domain::repository::{AttemptRepository, WindowCounterRepository};
use crate::presentation::handlers;
use crate::presentation::middleware::{AdmissionState, admission_guard};
use axum::{Router, middleware};
use platform::clock::SharedClock;
use platform::tasks::BackgroundTasks;
use platform::upstream::Upstream;
use std::sync::Arc;

/// Create the admission router: every request is relayed to `origin`, with
/// the admin-portal and flash-sale guards in front
pub fn admission_router<R, U>(
    repo: R,
    origin: U,
    config: Arc<AdmissionConfig>,
    clock: SharedClock,
    tasks: BackgroundTasks,
) -> Router
where
    R: AttemptRepository + WindowCounterRepository + Clone + Send + Sync + 'static,
    U: Upstream + Send + Sync + 'static,
{
    let state = AdmissionState {
        repo: Arc::new(repo),
        config,
        clock,
        tasks,
    };

    Router::new()
        .fallback(handlers::proxy_to_origin::<U>)
        .with_state(Arc::new(origin))
        .layer(middleware::from_fn_with_state(state, admission_guard::<R>))
}
