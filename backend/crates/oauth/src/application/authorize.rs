//! Authorize Use Case

use crate::application::config::OAuthConfig;
use crate::application::with_query_params;
use crate::domain::entities::OAuthRequestState;
use crate::domain::repository::AuthorizationRequestRepository;
use crate::domain::value_objects::DEFAULT_SCOPE;
use crate::error::{OAuthError, OAuthResult};
use platform::clock::SharedClock;
use reqwest::Url;
use std::sync::Arc;

/// Input DTO for authorize
#[derive(Debug, Clone, Default)]
pub struct AuthorizeInput {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub scope: Option<String>,
}

/// Authorize Use Case
pub struct AuthorizeUseCase<R>
where
    R: AuthorizationRequestRepository,
{
    repo: Arc<R>,
    config: Arc<OAuthConfig>,
    clock: SharedClock,
}

impl<R> AuthorizeUseCase<R>
where
    R: AuthorizationRequestRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<OAuthConfig>, clock: SharedClock) -> Self {
        Self {
            repo,
            config,
            clock,
        }
    }

    /// Park the client request and return the provider authorization URL
    pub async fn execute(&self, input: AuthorizeInput, base_url: &str) -> OAuthResult<Url> {
        let (Some(client_id), Some(redirect_uri), Some(state)) = (
            non_empty(input.client_id),
            non_empty(input.redirect_uri),
            non_empty(input.state),
        ) else {
            return Err(OAuthError::InvalidRequest(
                "Missing required parameters".to_string(),
            ));
        };

        if Url::parse(&redirect_uri).is_err() {
            return Err(OAuthError::InvalidRequest("Invalid redirect_uri".to_string()));
        }

        let scope = non_empty(input.scope).unwrap_or_else(|| DEFAULT_SCOPE.to_string());

        let request = OAuthRequestState {
            client_id,
            redirect_uri,
            state,
            code_challenge: non_empty(input.code_challenge),
            code_challenge_method: non_empty(input.code_challenge_method),
            scope,
            timestamp: self.clock.now_ms(),
        };

        self.repo
            .save_request(&request, self.config.request_ttl)
            .await?;

        let callback_uri = self.config.callback_uri(base_url);
        let url = with_query_params(
            &self.config.authorization_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", callback_uri.as_str()),
                ("response_type", "code"),
                ("scope", request.scope.as_str()),
                ("state", request.state.as_str()),
            ],
        )
        .map_err(OAuthError::Internal)?;

        tracing::info!(
            client_id = %request.client_id,
            pkce = request.code_challenge.is_some(),
            "Authorization started"
        );

        Ok(url)
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
