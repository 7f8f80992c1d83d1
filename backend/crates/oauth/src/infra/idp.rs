//! HTTP identity provider client
//!
//! Talks to the provider token endpoint with form-encoded POSTs carrying the
//! gateway's client credentials.

use crate::application::config::OAuthConfig;
use crate::domain::entities::UpstreamTokens;
use crate::domain::provider::IdentityProvider;
use crate::error::IdpError;
use reqwest::Client;
use std::time::Duration;

/// reqwest-backed identity provider
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl HttpIdentityProvider {
    pub fn new(config: &OAuthConfig) -> Result<Self, IdpError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| IdpError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    async fn post_form(&self, form: &[(&str, &str)]) -> Result<UpstreamTokens, IdpError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| IdpError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdpError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<UpstreamTokens>()
            .await
            .map_err(|e| IdpError::InvalidResponse(e.to_string()))
    }
}

impl IdentityProvider for HttpIdentityProvider {
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<UpstreamTokens, IdpError> {
        tracing::debug!(token_url = %self.token_url, "Exchanging authorization code");
        self.post_form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<UpstreamTokens, IdpError> {
        tracing::debug!(token_url = %self.token_url, "Refreshing provider token");
        self.post_form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }
}
