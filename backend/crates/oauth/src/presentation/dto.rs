//! API DTOs (Data Transfer Objects)
//!
//! Wire names follow RFC 6749, hence snake_case throughout.

use serde::{Deserialize, Serialize};

use crate::application::{AuthorizeInput, CallbackInput, TokenInput, TokenOutput};

// ============================================================================
// Authorize
// ============================================================================

/// GET /authorize query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeQuery {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub scope: Option<String>,
}

impl From<AuthorizeQuery> for AuthorizeInput {
    fn from(q: AuthorizeQuery) -> Self {
        Self {
            client_id: q.client_id,
            redirect_uri: q.redirect_uri,
            state: q.state,
            code_challenge: q.code_challenge,
            code_challenge_method: q.code_challenge_method,
            scope: q.scope,
        }
    }
}

// ============================================================================
// Callback
// ============================================================================

/// GET /callback query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

impl From<CallbackQuery> for CallbackInput {
    fn from(q: CallbackQuery) -> Self {
        Self {
            code: q.code,
            state: q.state,
        }
    }
}

// ============================================================================
// Token
// ============================================================================

/// POST /token form body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenForm {
    pub grant_type: Option<String>,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub code_verifier: Option<String>,
    pub client_id: Option<String>,
    pub refresh_token: Option<String>,
}

impl From<TokenForm> for TokenInput {
    fn from(f: TokenForm) -> Self {
        Self {
            grant_type: f.grant_type,
            code: f.code,
            redirect_uri: f.redirect_uri,
            code_verifier: f.code_verifier,
            client_id: f.client_id,
            refresh_token: f.refresh_token,
        }
    }
}

/// Token response
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl From<TokenOutput> for TokenResponse {
    fn from(o: TokenOutput) -> Self {
        Self {
            access_token: o.access_token,
            token_type: o.token_type,
            expires_in: o.expires_in,
            refresh_token: o.refresh_token,
        }
    }
}

// ============================================================================
// Protected resources
// ============================================================================

/// 401 body for protected resources
#[derive(Debug, Clone, Serialize)]
pub struct UnauthorizedResponse {
    pub error: &'static str,
    pub error_description: &'static str,
    pub authorization_url: String,
}
