//! OAuth Routers

use axum::{
    Router, middleware,
    routing::{any, get, post},
};
use platform::clock::SharedClock;
use platform::upstream::Upstream;
use std::sync::Arc;

use crate::application::config::OAuthConfig;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{
    AccessTokenRepository, AuthorizationCodeRepository, AuthorizationRequestRepository,
};
use crate::error::OAuthError;
use crate::presentation::handlers::{self, OAuthAppState};
use crate::presentation::middleware::{BearerState, require_bearer};

/// Paths of the protected resource surface
pub const PROTECTED_PATHS: [&str; 3] = ["/mcp", "/mcp/sse", "/sse"];

/// Create the OAuth router (`/authorize`, `/callback`, `/token`)
pub fn oauth_router<R, P>(repo: R, provider: P, config: OAuthConfig, clock: SharedClock) -> Router
where
    R: AuthorizationRequestRepository
        + AuthorizationCodeRepository
        + AccessTokenRepository
        + Clone
        + Send
        + Sync
        + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let state = OAuthAppState {
        repo: Arc::new(repo),
        provider: Arc::new(provider),
        config: Arc::new(config),
        clock,
    };

    Router::new()
        .route("/authorize", get(handlers::authorize::<R, P>))
        .route("/callback", get(handlers::callback::<R, P>))
        .route("/token", post(handlers::token::<R, P>))
        .with_state(state)
}

/// Stand-in for the OAuth router when the provider is not configured
pub fn oauth_unavailable_router() -> Router {
    async fn unavailable() -> OAuthError {
        OAuthError::NotConfigured
    }

    Router::new()
        .route("/authorize", any(unavailable))
        .route("/callback", any(unavailable))
        .route("/token", any(unavailable))
}

/// Create the protected resource router; requests are relayed to `backend`
/// once their bearer token verifies
pub fn protected_router<R, U>(repo: R, backend: U, config: OAuthConfig) -> Router
where
    R: AccessTokenRepository + Clone + Send + Sync + 'static,
    U: Upstream + Send + Sync + 'static,
{
    let bearer = BearerState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    let mut router = Router::new();
    for path in PROTECTED_PATHS {
        router = router.route(
            path,
            get(handlers::proxy_protected::<U>).post(handlers::proxy_protected::<U>),
        );
    }

    router
        .with_state(Arc::new(backend))
        .route_layer(middleware::from_fn_with_state(bearer, require_bearer::<R>))
}
