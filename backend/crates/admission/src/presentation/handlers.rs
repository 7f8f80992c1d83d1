//! HTTP Handlers

use crate::error::AdmissionResult;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::Response;
use platform::upstream::Upstream;
use std::sync::Arc;

/// Fallback: relay the request to the origin unchanged
pub async fn proxy_to_origin<U>(
    State(origin): State<Arc<U>>,
    req: Request,
) -> AdmissionResult<Response<Body>>
where
    U: Upstream + Send + Sync + 'static,
{
    let response = origin.forward(req).await?;
    Ok(response)
}
