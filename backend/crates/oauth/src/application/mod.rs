//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod authorize;
pub mod callback;
pub mod config;
pub mod token;
pub mod verify;

pub use authorize::{AuthorizeInput, AuthorizeUseCase};
pub use callback::{CallbackInput, CallbackUseCase};
pub use token::{TokenInput, TokenOutput, TokenUseCase};
pub use verify::VerifyAccessUseCase;

use reqwest::Url;

/// `base` with the given query parameters set, replacing existing ones of
/// the same name
pub(crate) fn with_query_params(base: &str, params: &[(&str, &str)]) -> Result<Url, String> {
    let mut url = Url::parse(base).map_err(|e| format!("{base}: {e}"))?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !params.iter().any(|(name, _)| name == k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        query.extend_pairs(params.iter().copied());
    }
    Ok(url)
}
