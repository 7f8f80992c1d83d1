//! Callback Use Case

use crate::application::authorize::non_empty;
use crate::application::config::OAuthConfig;
use crate::application::with_query_params;
use crate::domain::entities::AuthorizationCode;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{AuthorizationCodeRepository, AuthorizationRequestRepository};
use crate::error::{OAuthError, OAuthResult};
use kernel::id::AuthorizationCodeId;
use platform::clock::SharedClock;
use reqwest::Url;
use std::sync::Arc;

/// Input DTO for callback
#[derive(Debug, Clone, Default)]
pub struct CallbackInput {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Callback Use Case
pub struct CallbackUseCase<R, P>
where
    R: AuthorizationRequestRepository + AuthorizationCodeRepository,
    P: IdentityProvider,
{
    repo: Arc<R>,
    provider: Arc<P>,
    config: Arc<OAuthConfig>,
    clock: SharedClock,
}

impl<R, P> CallbackUseCase<R, P>
where
    R: AuthorizationRequestRepository + AuthorizationCodeRepository,
    P: IdentityProvider,
{
    pub fn new(
        repo: Arc<R>,
        provider: Arc<P>,
        config: Arc<OAuthConfig>,
        clock: SharedClock,
    ) -> Self {
        Self {
            repo,
            provider,
            config,
            clock,
        }
    }

    /// Exchange the provider code and return the client redirect URL
    pub async fn execute(&self, input: CallbackInput, base_url: &str) -> OAuthResult<Url> {
        let (Some(provider_code), Some(state)) = (non_empty(input.code), non_empty(input.state))
        else {
            return Err(OAuthError::InvalidRequest("Missing code or state".to_string()));
        };

        let request = self
            .repo
            .find_request(&state)
            .await?
            .ok_or_else(|| OAuthError::InvalidGrant("Invalid or expired state".to_string()))?;

        let callback_uri = self.config.callback_uri(base_url);
        let tokens = self
            .provider
            .exchange_code(&provider_code, &callback_uri)
            .await
            .map_err(OAuthError::TokenExchange)?;

        // The state is spent before a code exists for it
        self.repo.delete_request(&state).await?;

        let code = AuthorizationCodeId::new().to_string();
        let record = AuthorizationCode::issue(request, tokens, self.clock.now_ms());

        self.repo
            .save_code(&code, &record, self.config.code_ttl)
            .await?;

        tracing::info!(client_id = %record.client_id, "Authorization code issued");

        with_query_params(
            &record.redirect_uri,
            &[("code", code.as_str()), ("state", state.as_str())],
        )
        .map_err(OAuthError::InvalidRequest)
    }
}
