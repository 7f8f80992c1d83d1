//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Extension, Form, Query, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use platform::clock::SharedClock;
use platform::upstream::Upstream;
use reqwest::Url;
use std::sync::Arc;

use crate::application::config::OAuthConfig;
use crate::application::{AuthorizeUseCase, CallbackUseCase, TokenUseCase};
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{
    AccessTokenRepository, AuthorizationCodeRepository, AuthorizationRequestRepository,
};
use crate::domain::value_objects::VerifiedAccess;
use crate::error::{OAuthError, OAuthResult};
use crate::presentation::dto::{AuthorizeQuery, CallbackQuery, TokenForm, TokenResponse};

/// Shared state for OAuth handlers
#[derive(Clone)]
pub struct OAuthAppState<R, P>
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
    pub repo: Arc<R>,
    pub provider: Arc<P>,
    pub config: Arc<OAuthConfig>,
    pub clock: SharedClock,
}

/// Externally visible base URL of this gateway
///
/// The configured public URL wins; otherwise it is rebuilt from `Host` and
/// `X-Forwarded-Proto`.
pub fn request_base_url(headers: &HeaderMap, config: &OAuthConfig) -> String {
    if let Some(base) = config.public_base_url.as_deref() {
        return base.trim_end_matches('/').to_string();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    format!("{proto}://{host}")
}

/// 302 to `url`
fn found(url: Url) -> Response {
    match HeaderValue::from_str(url.as_str()) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(_) => OAuthError::Internal("Unrepresentable redirect URL".to_string()).into_response(),
    }
}

// ============================================================================
// Authorize
// ============================================================================

/// GET /authorize
pub async fn authorize<R, P>(
    State(state): State<OAuthAppState<R, P>>,
    headers: HeaderMap,
    query: Result<Query<AuthorizeQuery>, QueryRejection>,
) -> OAuthResult<Response>
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
    let Query(query) = query.map_err(|e| OAuthError::InvalidRequest(e.body_text()))?;

    let base_url = request_base_url(&headers, &state.config);
    let use_case = AuthorizeUseCase::new(state.repo.clone(), state.config.clone(), state.clock.clone());

    let url = use_case.execute(query.into(), &base_url).await?;
    Ok(found(url))
}

// ============================================================================
// Callback
// ============================================================================

/// GET /callback
pub async fn callback<R, P>(
    State(state): State<OAuthAppState<R, P>>,
    headers: HeaderMap,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> OAuthResult<Response>
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
    let Query(query) = query.map_err(|e| OAuthError::InvalidRequest(e.body_text()))?;

    let base_url = request_base_url(&headers, &state.config);
    let use_case = CallbackUseCase::new(
        state.repo.clone(),
        state.provider.clone(),
        state.config.clone(),
        state.clock.clone(),
    );

    let url = use_case.execute(query.into(), &base_url).await?;
    Ok(found(url))
}

// ============================================================================
// Token
// ============================================================================

/// POST /token
pub async fn token<R, P>(
    State(state): State<OAuthAppState<R, P>>,
    form: Result<Form<TokenForm>, FormRejection>,
) -> OAuthResult<impl IntoResponse>
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
    let Form(form) = form.map_err(|e| OAuthError::InvalidRequest(e.body_text()))?;

    let use_case = TokenUseCase::new(
        state.repo.clone(),
        state.provider.clone(),
        state.config.clone(),
        state.clock.clone(),
    );

    let output = use_case.execute(form.into()).await?;

    Ok((
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(TokenResponse::from(output)),
    ))
}

// ============================================================================
// Protected resources
// ============================================================================

/// GET|POST /mcp, /mcp/sse, /sse
///
/// Relays the request to the backend, swapping the gateway token for the
/// provider token bound to it.
pub async fn proxy_protected<U>(
    State(backend): State<Arc<U>>,
    Extension(access): Extension<VerifiedAccess>,
    mut req: Request,
) -> OAuthResult<Response>
where
    U: Upstream + Send + Sync + 'static,
{
    let bearer = HeaderValue::from_str(&format!("Bearer {}", access.upstream_access_token))
        .map_err(|_| OAuthError::Internal("Unrepresentable upstream token".to_string()))?;
    req.headers_mut().insert(header::AUTHORIZATION, bearer);

    let response = backend.forward(req).await?;
    Ok(response)
}
