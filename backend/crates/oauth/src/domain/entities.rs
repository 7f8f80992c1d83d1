//! Domain Entities
//!
//! Records persisted between the steps of the authorization flow. Field
//! names are the stored JSON names.

use serde::{Deserialize, Serialize};

/// Client authorization request parked between `/authorize` and `/callback`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthRequestState {
    pub client_id: String,
    pub redirect_uri: String,
    pub state: String,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub scope: String,
    /// Epoch milliseconds of creation
    pub timestamp: i64,
}

/// Single-use code handed to the client after the provider callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: String,
    pub redirect_uri: String,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub scope: String,
    pub timestamp: i64,
}

impl AuthorizationCode {
    /// Bind provider tokens to the parked client request
    pub fn issue(request: OAuthRequestState, tokens: UpstreamTokens, now_ms: i64) -> Self {
        Self {
            access_token: tokens.access_token,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
            client_id: request.client_id,
            redirect_uri: request.redirect_uri,
            code_challenge: request.code_challenge,
            code_challenge_method: request.code_challenge_method,
            scope: request.scope,
            timestamp: now_ms,
        }
    }
}

/// Gateway access token record; never mutated after issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedAccessToken {
    pub upstream_access_token: String,
    pub id_token: Option<String>,
    pub scope: String,
    pub client_id: Option<String>,
    pub timestamp: i64,
}

/// Token endpoint response from the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamTokens {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
