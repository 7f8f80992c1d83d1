//! OAuth Error Types
//!
//! This module provides OAuth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system. Client-facing codes use
//! the RFC 6749 vocabulary (`invalid_request`, `invalid_grant`, ...).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::kv::KvError;
use platform::upstream::UpstreamError;
use thiserror::Error;

/// OAuth-specific result type alias
pub type OAuthResult<T> = Result<T, OAuthError>;

/// Identity provider errors
#[derive(Debug, Error)]
pub enum IdpError {
    /// The token endpoint answered with a non-success status
    #[error("identity provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The token endpoint could not be reached
    #[error("identity provider unreachable: {0}")]
    Transport(String),

    /// The token endpoint answered success with an unusable body
    #[error("identity provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// OAuth-specific error variants
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Required parameter missing or malformed
    #[error("{0}")]
    InvalidRequest(String),

    /// State, code, verifier or refresh token not accepted
    #[error("{0}")]
    InvalidGrant(String),

    /// Grant type other than `authorization_code` / `refresh_token`
    #[error("Unsupported grant type")]
    UnsupportedGrantType,

    /// Upstream code exchange failed during the callback
    #[error("Token exchange failed: {0}")]
    TokenExchange(#[source] IdpError),

    /// Identity provider settings are absent
    #[error("OAuth is not configured")]
    NotConfigured,

    /// KV store error
    #[error("OAuth store error: {0}")]
    Store(#[from] KvError),

    /// Protected resource backend could not be reached
    #[error("Backend error: {0}")]
    Backend(#[from] UpstreamError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OAuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            OAuthError::InvalidRequest(_)
            | OAuthError::InvalidGrant(_)
            | OAuthError::UnsupportedGrantType => StatusCode::BAD_REQUEST,
            OAuthError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            OAuthError::Backend(_) => StatusCode::BAD_GATEWAY,
            OAuthError::TokenExchange(_) | OAuthError::Store(_) | OAuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            OAuthError::InvalidRequest(_)
            | OAuthError::InvalidGrant(_)
            | OAuthError::UnsupportedGrantType => ErrorKind::BadRequest,
            OAuthError::NotConfigured => ErrorKind::ServiceUnavailable,
            OAuthError::Backend(_) => ErrorKind::BadGateway,
            OAuthError::TokenExchange(_) | OAuthError::Store(_) | OAuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// OAuth error code sent to the client
    pub fn code(&self) -> &'static str {
        match self {
            OAuthError::InvalidRequest(_) => "invalid_request",
            OAuthError::InvalidGrant(_) => "invalid_grant",
            OAuthError::UnsupportedGrantType => "unsupported_grant_type",
            OAuthError::NotConfigured => "temporarily_unavailable",
            OAuthError::Backend(_) => "bad_gateway",
            OAuthError::TokenExchange(_) | OAuthError::Store(_) | OAuthError::Internal(_) => {
                "server_error"
            }
        }
    }

    /// Convert to AppError
    ///
    /// Store and internal failures are not described to the client; the
    /// token exchange failure carries the provider's error text.
    pub fn to_app_error(&self) -> AppError {
        let message = match self {
            OAuthError::Store(_) | OAuthError::Internal(_) => "Internal error".to_string(),
            OAuthError::Backend(_) => "Backend unavailable".to_string(),
            _ => self.to_string(),
        };
        AppError::new(self.kind(), message).with_code(self.code())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            OAuthError::Store(e) => {
                tracing::error!(error = %e, "OAuth store error");
            }
            OAuthError::Internal(msg) => {
                tracing::error!(message = %msg, "OAuth internal error");
            }
            OAuthError::TokenExchange(e) => {
                tracing::error!(error = %e, "Token exchange failed");
            }
            OAuthError::Backend(e) => {
                tracing::error!(error = %e, "Protected resource backend error");
            }
            OAuthError::InvalidGrant(msg) => {
                tracing::warn!(reason = %msg, "OAuth grant rejected");
            }
            _ => {
                tracing::debug!(error = %self, "OAuth error");
            }
        }
    }
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_use_oauth_codes() {
        let err = OAuthError::InvalidGrant("Invalid code verifier".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let app = err.to_app_error();
        assert_eq!(app.code(), "invalid_grant");
        assert_eq!(app.message(), "Invalid code verifier");
        assert_eq!(app.status_code(), 400);

        assert_eq!(
            OAuthError::UnsupportedGrantType.to_app_error().code(),
            "unsupported_grant_type"
        );
    }

    #[test]
    fn test_token_exchange_surfaces_provider_text() {
        let err = OAuthError::TokenExchange(IdpError::Rejected {
            status: 401,
            body: "bad client".into(),
        });
        let app = err.to_app_error();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.code(), "server_error");
        assert!(app.message().contains("bad client"));
    }

    #[test]
    fn test_store_errors_are_not_described() {
        let err = OAuthError::Store(KvError::Backend("connection refused".into()));
        let app = err.to_app_error();
        assert_eq!(app.status_code(), 500);
        assert!(!app.message().contains("connection refused"));
    }
}
