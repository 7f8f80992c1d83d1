//! Identity Provider Trait
//!
//! The upstream authorization server. Only its token endpoint is called
//! from here; the authorization endpoint is reached by redirect.

use crate::domain::entities::UpstreamTokens;
use crate::error::IdpError;

#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Trade a provider authorization code for provider tokens
    async fn exchange_code(&self, code: &str, redirect_uri: &str)
    -> Result<UpstreamTokens, IdpError>;

    /// Trade a provider refresh token for fresh provider tokens
    async fn refresh(&self, refresh_token: &str) -> Result<UpstreamTokens, IdpError>;
}
