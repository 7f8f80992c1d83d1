//! Verify Access Use Case

use crate::domain::repository::AccessTokenRepository;
use crate::domain::services::parse_bearer;
use crate::domain::value_objects::VerifiedAccess;
use crate::error::OAuthResult;
use std::sync::Arc;

/// Verify Access Use Case
///
/// The stored record is the whole proof: the provider token it carries is
/// not re-validated.
pub struct VerifyAccessUseCase<R>
where
    R: AccessTokenRepository,
{
    repo: Arc<R>,
}

impl<R> VerifyAccessUseCase<R>
where
    R: AccessTokenRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// `None` for an absent, non-Bearer, unknown or expired credential
    pub async fn verify(&self, authorization: Option<&str>) -> OAuthResult<Option<VerifiedAccess>> {
        let Some(token) = authorization.and_then(parse_bearer) else {
            return Ok(None);
        };

        let access = self
            .repo
            .find_token(token)
            .await?
            .map(|record| VerifiedAccess {
                upstream_access_token: record.upstream_access_token,
                id_token: record.id_token,
                scope: record.scope,
            });

        Ok(access)
    }
}
