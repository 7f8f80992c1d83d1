//! Domain Value Objects

use std::str::FromStr;

/// Scope used when the client asks for none, and for refreshed tokens
pub const DEFAULT_SCOPE: &str = "openid profile email";

/// Token type returned to clients
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Supported `grant_type` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

impl FromStr for GrantType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorization_code" => Ok(GrantType::AuthorizationCode),
            "refresh_token" => Ok(GrantType::RefreshToken),
            _ => Err(()),
        }
    }
}

/// Result of a successful bearer verification
///
/// Inserted into request extensions by the bearer middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccess {
    pub upstream_access_token: String,
    pub id_token: Option<String>,
    pub scope: String,
}
