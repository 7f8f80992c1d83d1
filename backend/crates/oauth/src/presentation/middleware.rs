//! Bearer Middleware
//!
//! Guards protected resources. A verified request carries
//! [`VerifiedAccess`] in its extensions for the handler behind it.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::VerifyAccessUseCase;
use crate::application::config::OAuthConfig;
use crate::domain::repository::AccessTokenRepository;
use crate::presentation::dto::UnauthorizedResponse;
use crate::presentation::handlers::request_base_url;

/// Realm advertised in `WWW-Authenticate`
pub const BEARER_REALM: &str = "MCP Server";

/// Middleware state
#[derive(Clone)]
pub struct BearerState<R>
where
    R: AccessTokenRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<OAuthConfig>,
}

/// Middleware that requires a valid gateway access token
pub async fn require_bearer<R>(
    State(state): State<BearerState<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: AccessTokenRepository + Clone + Send + Sync + 'static,
{
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let use_case = VerifyAccessUseCase::new(state.repo.clone());

    match use_case.verify(authorization.as_deref()).await {
        Ok(Some(access)) => {
            req.extensions_mut().insert(access);
            next.run(req).await
        }
        Ok(None) => {
            tracing::debug!(path = %req.uri().path(), "Missing or unknown bearer token");
            let base_url = request_base_url(req.headers(), &state.config);
            unauthorized(&base_url)
        }
        Err(e) => e.into_response(),
    }
}

/// 401 pointing the client at the authorization endpoint
pub fn unauthorized(base_url: &str) -> Response {
    let authorization_url = format!("{base_url}/authorize");
    let challenge = format!(
        r#"Bearer realm="{BEARER_REALM}", authorization_url="{authorization_url}""#
    );

    let body = Json(UnauthorizedResponse {
        error: "unauthorized",
        error_description: "Valid access token required",
        authorization_url,
    });

    let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
    if let Ok(value) = HeaderValue::from_str(&challenge) {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, value);
    }
    response
}
