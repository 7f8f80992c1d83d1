//! Admission Error Types
//!
//! Storage errors never reach the client: the middleware catches them and
//! fails open. Only a broken origin exchange is rendered as a response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::cache::CacheError;
use platform::kv::KvError;
use platform::upstream::UpstreamError;
use thiserror::Error;

/// Admission-specific result type alias
pub type AdmissionResult<T> = Result<T, AdmissionError>;

/// Admission-specific error variants
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Attempt store failed
    #[error("Attempt store error: {0}")]
    Store(#[from] KvError),

    /// Window counter cache failed
    #[error("Window cache error: {0}")]
    Cache(#[from] CacheError),

    /// Origin could not be reached
    #[error("Origin error: {0}")]
    Origin(#[from] UpstreamError),
}

impl AdmissionError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdmissionError::Store(_) | AdmissionError::Cache(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AdmissionError::Origin(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdmissionError::Store(_) | AdmissionError::Cache(_) => {
                ErrorKind::InternalServerError
            }
            AdmissionError::Origin(_) => ErrorKind::BadGateway,
        }
    }

    /// Whether the admission decision itself failed (as opposed to the
    /// forward after it)
    pub fn is_storage(&self) -> bool {
        matches!(self, AdmissionError::Store(_) | AdmissionError::Cache(_))
    }

    fn log(&self) {
        match self {
            AdmissionError::Origin(e) => {
                tracing::error!(error = %e, "Origin forward failed");
            }
            _ => {
                tracing::error!(error = %self, "Admission storage error");
            }
        }
    }
}

impl From<AdmissionError> for AppError {
    fn from(err: AdmissionError) -> Self {
        let app = match err {
            AdmissionError::Origin(_) => AppError::bad_gateway("Origin server unavailable"),
            _ => AppError::internal("Internal error"),
        };
        app.with_source(err)
    }
}

/// Response extension set when the origin could not be reached
///
/// The admission guard reads it to mark the response as a fallback instead
/// of decorating the 502 as a normal pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginUnavailable;

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        self.log();
        let origin_failed = matches!(self, AdmissionError::Origin(_));
        let mut response = AppError::from(self).into_response();
        if origin_failed {
            response.extensions_mut().insert(OriginUnavailable);
        }
        response
    }
}
