//! Token Use Case
//!
//! `authorization_code` and `refresh_token` grants. A code is taken out of
//! the store before a token is issued, so it redeems at most once. A wrong
//! PKCE verifier puts the code back for the rest of its lifetime.

use crate::application::authorize::non_empty;
use crate::application::config::OAuthConfig;
use crate::domain::entities::{AuthorizationCode, IssuedAccessToken};
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{AccessTokenRepository, AuthorizationCodeRepository};
use crate::domain::services::pkce_satisfied;
use crate::domain::value_objects::{DEFAULT_SCOPE, GrantType, TOKEN_TYPE_BEARER};
use crate::error::{IdpError, OAuthError, OAuthResult};
use kernel::id::AccessTokenId;
use platform::clock::SharedClock;
use std::sync::Arc;
use std::time::Duration;

/// Input DTO for token
#[derive(Debug, Clone, Default)]
pub struct TokenInput {
    pub grant_type: Option<String>,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub code_verifier: Option<String>,
    pub client_id: Option<String>,
    pub refresh_token: Option<String>,
}

/// Output DTO for token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOutput {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

/// Token Use Case
pub struct TokenUseCase<R, P>
where
    R: AuthorizationCodeRepository + AccessTokenRepository,
    P: IdentityProvider,
{
    repo: Arc<R>,
    provider: Arc<P>,
    config: Arc<OAuthConfig>,
    clock: SharedClock,
}

impl<R, P> TokenUseCase<R, P>
where
    R: AuthorizationCodeRepository + AccessTokenRepository,
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

    pub async fn execute(&self, input: TokenInput) -> OAuthResult<TokenOutput> {
        let grant_type = input
            .grant_type
            .as_deref()
            .and_then(|g| g.parse::<GrantType>().ok())
            .ok_or(OAuthError::UnsupportedGrantType)?;

        match grant_type {
            GrantType::AuthorizationCode => self.redeem_code(input).await,
            GrantType::RefreshToken => self.refresh(input).await,
        }
    }

    async fn redeem_code(&self, input: TokenInput) -> OAuthResult<TokenOutput> {
        let (Some(code), Some(_redirect_uri)) =
            (non_empty(input.code), non_empty(input.redirect_uri))
        else {
            return Err(OAuthError::InvalidRequest(
                "Missing code or redirect_uri".to_string(),
            ));
        };

        let record = self.repo.take_code(&code).await?.ok_or_else(|| {
            OAuthError::InvalidGrant("Invalid or expired authorization code".to_string())
        })?;

        if !pkce_satisfied(&record, input.code_verifier.as_deref()) {
            self.restore_code(&code, &record).await;
            return Err(OAuthError::InvalidGrant("Invalid code verifier".to_string()));
        }

        let token = IssuedAccessToken {
            upstream_access_token: record.access_token,
            id_token: record.id_token,
            scope: record.scope,
            client_id: Some(record.client_id),
            timestamp: self.clock.now_ms(),
        };
        let output = self.issue(&token, record.refresh_token).await?;

        tracing::info!(client_id = ?token.client_id, "Access token issued");
        Ok(output)
    }

    /// Put a code back with whatever lifetime it had left
    async fn restore_code(&self, code: &str, record: &AuthorizationCode) {
        let age_ms = self.clock.now_ms().saturating_sub(record.timestamp).max(0) as u64;
        let remaining = self
            .config
            .code_ttl
            .saturating_sub(Duration::from_millis(age_ms));
        if remaining.is_zero() {
            return;
        }

        if let Err(e) = self.repo.save_code(code, record, remaining).await {
            tracing::warn!(error = %e, "Failed to restore authorization code");
        }
    }

    async fn refresh(&self, input: TokenInput) -> OAuthResult<TokenOutput> {
        let Some(refresh_token) = non_empty(input.refresh_token) else {
            return Err(OAuthError::InvalidRequest("Missing refresh_token".to_string()));
        };

        let tokens = match self.provider.refresh(&refresh_token).await {
            Ok(tokens) => tokens,
            Err(IdpError::Rejected { status, .. }) => {
                tracing::debug!(status, "Provider rejected refresh token");
                return Err(OAuthError::InvalidGrant("Invalid refresh token".to_string()));
            }
            Err(e) => return Err(OAuthError::TokenExchange(e)),
        };

        let token = IssuedAccessToken {
            upstream_access_token: tokens.access_token,
            id_token: tokens.id_token,
            scope: DEFAULT_SCOPE.to_string(),
            client_id: non_empty(input.client_id),
            timestamp: self.clock.now_ms(),
        };
        let output = self.issue(&token, tokens.refresh_token).await?;

        tracing::info!(client_id = ?token.client_id, "Access token refreshed");
        Ok(output)
    }

    async fn issue(
        &self,
        token: &IssuedAccessToken,
        refresh_token: Option<String>,
    ) -> OAuthResult<TokenOutput> {
        let access_token = AccessTokenId::new().to_string();

        self.repo
            .save_token(&access_token, token, self.config.token_ttl)
            .await?;

        Ok(TokenOutput {
            access_token,
            token_type: TOKEN_TYPE_BEARER,
            expires_in: self.config.token_ttl_secs(),
            refresh_token,
        })
    }
}
