//! Upstream forwarding
//!
//! The origin server and the backend API are opaque collaborators: the
//! gateway hands them a request and relays whatever comes back. Only
//! hop-by-hop headers are dropped on the way through.

use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, HeaderName, Request, Response, header};
use reqwest::{Client, Url};
use std::time::Duration;

/// Maximum request body buffered before forwarding
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Upstream forwarding errors
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The upstream could not be reached or the exchange broke mid-way
    #[error("Upstream {upstream} unreachable: {source}")]
    Unreachable {
        upstream: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The inbound request body could not be read
    #[error("Failed to read request body: {0}")]
    Body(String),

    /// The upstream URL could not be built
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),
}

/// Trait for forwarding a request to an upstream and relaying the response
#[trait_variant::make(Upstream: Send)]
pub trait LocalUpstream {
    async fn forward(&self, req: Request<Body>) -> Result<Response<Body>, UpstreamError>;
}

const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Copy headers minus hop-by-hop ones and `Host`
fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if name == header::HOST || HOP_BY_HOP.contains(name) || name.as_str() == "keep-alive" {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// reqwest-backed upstream
#[derive(Clone)]
pub struct HttpUpstream {
    name: &'static str,
    base_url: Url,
    client: Client,
    body_limit: usize,
}

impl HttpUpstream {
    /// Create an upstream for `base_url`
    ///
    /// Redirects are relayed to the client rather than followed.
    pub fn new(name: &'static str, base_url: &str) -> Result<Self, UpstreamError> {
        let base_url =
            Url::parse(base_url).map_err(|e| UpstreamError::InvalidUrl(format!("{base_url}: {e}")))?;

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|source| UpstreamError::Unreachable {
                upstream: name,
                source,
            })?;

        Ok(Self {
            name,
            base_url,
            client,
            body_limit: DEFAULT_BODY_LIMIT,
        })
    }

    /// Target URL: the base URL with the request path and query appended
    fn target_url(&self, req: &Request<Body>) -> Result<Url, UpstreamError> {
        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path_and_query}"))
            .map_err(|e| UpstreamError::InvalidUrl(e.to_string()))
    }
}

impl Upstream for HttpUpstream {
    async fn forward(&self, req: Request<Body>) -> Result<Response<Body>, UpstreamError> {
        let url = self.target_url(&req)?;
        let (parts, body) = req.into_parts();

        let body = to_bytes(body, self.body_limit)
            .await
            .map_err(|e| UpstreamError::Body(e.to_string()))?;

        tracing::debug!(upstream = self.name, method = %parts.method, url = %url, "Forwarding request");

        let upstream_response = self
            .client
            .request(parts.method, url)
            .headers(forwardable_headers(&parts.headers))
            .body(body)
            .send()
            .await
            .map_err(|source| UpstreamError::Unreachable {
                upstream: self.name,
                source,
            })?;

        let status = upstream_response.status();
        let headers = forwardable_headers(upstream_response.headers());
        let bytes = upstream_response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Unreachable {
                upstream: self.name,
                source,
            })?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwardable_headers_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("edge.example"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8"));
        headers.append("x-custom", HeaderValue::from_static("a"));
        headers.append("x-custom", HeaderValue::from_static("b"));

        let out = forwardable_headers(&headers);
        assert!(out.get(header::HOST).is_none());
        assert!(out.get(header::CONNECTION).is_none());
        assert!(out.get("keep-alive").is_none());
        assert!(out.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(out.get(header::USER_AGENT).unwrap(), "curl/8");
        assert_eq!(out.get_all("x-custom").iter().count(), 2);
    }

    #[test]
    fn test_target_url_keeps_path_and_query() {
        let upstream = HttpUpstream::new("origin", "https://origin.example/").unwrap();
        let req = Request::builder()
            .uri("/flash-sale/deals?page=2")
            .body(Body::empty())
            .unwrap();

        let url = upstream.target_url(&req).unwrap();
        assert_eq!(url.as_str(), "https://origin.example/flash-sale/deals?page=2");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpUpstream::new("origin", "not a url"),
            Err(UpstreamError::InvalidUrl(_))
        ));
    }
}
