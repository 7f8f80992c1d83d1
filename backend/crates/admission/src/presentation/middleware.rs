//! Admission Middleware
//!
//! Runs in front of the origin proxy. Requests outside the guarded prefixes
//! pass straight through. Guard failures never reach the client: the
//! request is forwarded with a fallback marker header instead. The same
//! marker replaces the pass headers when the origin itself is unreachable.

use crate::application::admin_guard::AdminGuardUseCase;
use crate::application::config::{AdmissionConfig, GuardKind};
use crate::application::flash_sale_guard::FlashSaleGuardUseCase;
use crate::domain::repository::{AttemptRepository, WindowCounterRepository};
use crate::domain::value_objects::{AdminDecision, FlashSaleDecision};
use crate::error::OriginUnavailable;
use crate::presentation::synthesizer::{
    HeaderSet, ThrottlePage, admin_block_redirect, admin_fallback_headers, admin_warning_headers,
    flash_sale_fallback_headers, flash_sale_pass_headers, with_headers,
};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::Response;
use axum::middleware::Next;
use platform::client::{ClientIdentity, extract_client_identity, extract_user_agent};
use platform::clock::SharedClock;
use platform::tasks::BackgroundTasks;
use std::sync::Arc;

/// Middleware state
#[derive(Clone)]
pub struct AdmissionState<R>
where
    R: AttemptRepository + WindowCounterRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AdmissionConfig>,
    pub clock: SharedClock,
    pub tasks: BackgroundTasks,
}

/// Middleware that applies the guard matching the request path
pub async fn admission_guard<R>(
    State(state): State<AdmissionState<R>>,
    req: Request,
    next: Next,
) -> Response<Body>
where
    R: AttemptRepository + WindowCounterRepository + Clone + Send + Sync + 'static,
{
    let Some(guard) = state.config.guard_for(req.uri().path()) else {
        return next.run(req).await;
    };

    let identity = extract_client_identity(req.headers());

    match guard {
        GuardKind::AdminPortal => guard_admin_portal(&state, identity, req, next).await,
        GuardKind::FlashSale => guard_flash_sale(&state, identity, req, next).await,
    }
}

/// Apply `pass` to a forwarded response, or `fallback` when the origin
/// could not be reached
fn decorate(response: Response<Body>, pass: HeaderSet, fallback: HeaderSet) -> Response<Body> {
    if response.extensions().get::<OriginUnavailable>().is_some() {
        tracing::warn!("Origin unavailable behind admission guard, marking fallback");
        with_headers(response, &fallback)
    } else {
        with_headers(response, &pass)
    }
}

async fn guard_admin_portal<R>(
    state: &AdmissionState<R>,
    identity: ClientIdentity,
    req: Request,
    next: Next,
) -> Response<Body>
where
    R: AttemptRepository + WindowCounterRepository + Clone + Send + Sync + 'static,
{
    let user_agent = extract_user_agent(req.headers());
    let use_case = AdminGuardUseCase::new(state.repo.clone(), state.clock.clone());

    match use_case.execute(&identity, &user_agent).await {
        Ok(AdminDecision::Block { attempts }) => {
            admin_block_redirect(&state.config.admin_block_redirect_url, attempts, identity.as_str())
        }
        Ok(AdminDecision::Warn { attempts, remaining }) => {
            let response = next.run(req).await;
            decorate(
                response,
                admin_warning_headers(attempts, remaining),
                admin_fallback_headers(),
            )
        }
        Err(e) => {
            tracing::error!(client_ip = %identity, error = %e, "Admin protection error, failing open");
            let response = next.run(req).await;
            with_headers(response, &admin_fallback_headers())
        }
    }
}

async fn guard_flash_sale<R>(
    state: &AdmissionState<R>,
    identity: ClientIdentity,
    req: Request,
    next: Next,
) -> Response<Body>
where
    R: AttemptRepository + WindowCounterRepository + Clone + Send + Sync + 'static,
{
    let use_case = FlashSaleGuardUseCase::new(
        state.repo.clone(),
        state.config.clone(),
        state.clock.clone(),
        state.tasks.clone(),
    );

    match use_case.execute(&identity).await {
        Ok(FlashSaleDecision::Block {
            request_count,
            limit,
            retry_after_secs,
        }) => ThrottlePage {
            request_count,
            limit,
            window_secs: retry_after_secs,
            client_ip: identity.as_str(),
            protected_by: &state.config.protected_by,
        }
        .into_response(),
        Ok(FlashSaleDecision::Allow {
            request_count,
            limit,
            remaining,
        }) => {
            let response = next.run(req).await;
            decorate(
                response,
                flash_sale_pass_headers(request_count, limit, remaining, identity.as_str()),
                flash_sale_fallback_headers(),
            )
        }
        Err(e) => {
            tracing::error!(client_ip = %identity, error = %e, "Flash sale protection error, failing open");
            let response = next.run(req).await;
            with_headers(response, &flash_sale_fallback_headers())
        }
    }
}
