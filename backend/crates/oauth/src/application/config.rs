//! Application Configuration
//!
//! Configuration for the OAuth application layer.

use std::time::Duration;

/// OAuth application configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Client id registered with the identity provider
    pub client_id: String,
    /// Client secret registered with the identity provider
    pub client_secret: String,
    /// Provider authorization endpoint
    pub authorization_url: String,
    /// Provider token endpoint
    pub token_url: String,
    /// Externally visible base URL; derived from the request when unset
    pub public_base_url: Option<String>,
    /// Lifetime of a parked authorization request
    pub request_ttl: Duration,
    /// Lifetime of an unredeemed authorization code
    pub code_ttl: Duration,
    /// Lifetime of an issued access token
    pub token_ttl: Duration,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            authorization_url: String::new(),
            token_url: String::new(),
            public_base_url: None,
            request_ttl: Duration::from_secs(600),
            code_ttl: Duration::from_secs(300),
            token_ttl: Duration::from_secs(3600),
        }
    }
}

impl OAuthConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorization_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorization_url: authorization_url.into(),
            token_url: token_url.into(),
            ..Default::default()
        }
    }

    /// Whether every provider setting is present
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.authorization_url.is_empty()
            && !self.token_url.is_empty()
    }

    /// Redirect URI registered with the provider
    pub fn callback_uri(&self, base_url: &str) -> String {
        format!("{}/callback", base_url.trim_end_matches('/'))
    }

    pub fn token_ttl_secs(&self) -> u64 {
        self.token_ttl.as_secs()
    }
}
