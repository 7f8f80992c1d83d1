//! Repository Traits
//!
//! Interfaces for flow record persistence. Implementation is in
//! infrastructure layer.

use crate::domain::entities::{AuthorizationCode, IssuedAccessToken, OAuthRequestState};
use crate::error::OAuthResult;
use std::time::Duration;

/// Parked authorization request repository trait
#[trait_variant::make(AuthorizationRequestRepository: Send)]
pub trait LocalAuthorizationRequestRepository {
    async fn save_request(&self, request: &OAuthRequestState, ttl: Duration) -> OAuthResult<()>;

    async fn find_request(&self, state: &str) -> OAuthResult<Option<OAuthRequestState>>;

    async fn delete_request(&self, state: &str) -> OAuthResult<()>;
}

/// Authorization code repository trait
#[trait_variant::make(AuthorizationCodeRepository: Send)]
pub trait LocalAuthorizationCodeRepository {
    async fn save_code(&self, code: &str, record: &AuthorizationCode, ttl: Duration)
    -> OAuthResult<()>;

    /// Remove a code and return its record
    ///
    /// Atomic: of two concurrent takes of one code, at most one gets the record.
    async fn take_code(&self, code: &str) -> OAuthResult<Option<AuthorizationCode>>;
}

/// Access token repository trait
#[trait_variant::make(AccessTokenRepository: Send)]
pub trait LocalAccessTokenRepository {
    async fn save_token(&self, token: &str, record: &IssuedAccessToken, ttl: Duration)
    -> OAuthResult<()>;

    async fn find_token(&self, token: &str) -> OAuthResult<Option<IssuedAccessToken>>;
}
