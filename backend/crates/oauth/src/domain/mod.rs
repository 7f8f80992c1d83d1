//! Domain Layer - OAuth flow records and rules
//!
//! This layer contains:
//! - Domain entities (OAuthRequestState, AuthorizationCode, IssuedAccessToken)
//! - Domain value objects (grant type, bearer credentials, verified access)
//! - Domain services (PKCE and bearer header rules)
//! - Repository and identity provider traits (interfaces)

pub mod entities;
pub mod provider;
pub mod repository;
pub mod services;
pub mod value_objects;
