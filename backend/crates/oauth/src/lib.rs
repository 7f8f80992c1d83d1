//! OAuth (Authorization Code + PKCE) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Flow records, PKCE and bearer rules, repository and
//!   identity provider traits
//! - `application/` - Authorize, callback, token and verify use cases
//! - `infra/` - KV store repository, HTTP identity provider client
//! - `presentation/` - HTTP handlers, DTOs, bearer middleware, router
//!
//! ## Flow
//! `/authorize` parks the client's request under its `state` and sends the
//! user to the identity provider. `/callback` trades the provider's code for
//! provider tokens and hands the client a fresh single-use code. `/token`
//! trades that code (PKCE-checked) for a gateway access token bound to the
//! provider token.
//!
//! ## Security Model
//! - Every transient record lives in the KV store with a TTL; codes are
//!   single-use and deleted on redemption
//! - Unknown, expired and forged state/code/token values are rejected the
//!   same way
//! - A stored access token record is trusted as proof that the provider
//!   token it carries was valid when issued; the provider is not re-asked

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::OAuthConfig;
pub use error::{IdpError, OAuthError, OAuthResult};
pub use infra::idp::HttpIdentityProvider;
pub use infra::kv::KvOAuthRepository;
pub use presentation::router::{
    PROTECTED_PATHS, oauth_router, oauth_unavailable_router, protected_router,
};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[cfg(test)]
mod tests;
