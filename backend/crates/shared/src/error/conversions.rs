//! Error conversions
//!
//! HTTP rendering of [`AppError`](super::app_error::AppError).

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for super::app_error::AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::{StatusCode, header};

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Error responses must never be cached by intermediaries
        (
            status,
            [(header::CACHE_CONTROL, "no-store")],
            Json(self.to_body()),
        )
            .into_response()
    }
}
