//! KV store implementation of the OAuth repositories

use crate::domain::entities::{AuthorizationCode, IssuedAccessToken, OAuthRequestState};
use crate::domain::repository::{
    AccessTokenRepository, AuthorizationCodeRepository, AuthorizationRequestRepository,
};
use crate::error::OAuthResult;
use platform::kv::{KvStore, get_json, put_json, take_json};
use std::time::Duration;

pub const REQUEST_KEY_PREFIX: &str = "oauth_request:";
pub const CODE_KEY_PREFIX: &str = "auth_code:";
pub const TOKEN_KEY_PREFIX: &str = "access_token:";

/// OAuth repository over any KV store
#[derive(Clone)]
pub struct KvOAuthRepository<S>
where
    S: KvStore + Clone,
{
    store: S,
}

impl<S> KvOAuthRepository<S>
where
    S: KvStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn key(prefix: &str, id: &str) -> String {
    format!("{prefix}{id}")
}

impl<S> AuthorizationRequestRepository for KvOAuthRepository<S>
where
    S: KvStore + Clone + Sync,
{
    async fn save_request(&self, request: &OAuthRequestState, ttl: Duration) -> OAuthResult<()> {
        put_json(&self.store, &key(REQUEST_KEY_PREFIX, &request.state), request, ttl).await?;
        Ok(())
    }

    async fn find_request(&self, state: &str) -> OAuthResult<Option<OAuthRequestState>> {
        Ok(get_json(&self.store, &key(REQUEST_KEY_PREFIX, state)).await?)
    }

    async fn delete_request(&self, state: &str) -> OAuthResult<()> {
        self.store.delete(&key(REQUEST_KEY_PREFIX, state)).await?;
        Ok(())
    }
}

impl<S> AuthorizationCodeRepository for KvOAuthRepository<S>
where
    S: KvStore + Clone + Sync,
{
    async fn save_code(
        &self,
        code: &str,
        record: &AuthorizationCode,
        ttl: Duration,
    ) -> OAuthResult<()> {
        put_json(&self.store, &key(CODE_KEY_PREFIX, code), record, ttl).await?;
        Ok(())
    }

    async fn take_code(&self, code: &str) -> OAuthResult<Option<AuthorizationCode>> {
        Ok(take_json(&self.store, &key(CODE_KEY_PREFIX, code)).await?)
    }
}

impl<S> AccessTokenRepository for KvOAuthRepository<S>
where
    S: KvStore + Clone + Sync,
{
    async fn save_token(
        &self,
        token: &str,
        record: &IssuedAccessToken,
        ttl: Duration,
    ) -> OAuthResult<()> {
        put_json(&self.store, &key(TOKEN_KEY_PREFIX, token), record, ttl).await?;
        Ok(())
    }

    async fn find_token(&self, token: &str) -> OAuthResult<Option<IssuedAccessToken>> {
        Ok(get_json(&self.store, &key(TOKEN_KEY_PREFIX, token)).await?)
    }
}
