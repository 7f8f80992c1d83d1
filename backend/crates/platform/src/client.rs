//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::http::{HeaderMap, header};
use std::fmt;

/// Header set by the edge network with the connecting client address
pub const TRUSTED_CLIENT_IP_HEADER: &str = "cf-connecting-ip";

/// Standard forwarded-for header (first entry is the original client)
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Identity used when no client header is present
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Advisory client identity
///
/// Derived from proxy headers and therefore spoofable by anyone who can reach
/// the gateway directly. It keys admission counters; it is never used as an
/// authentication credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_CLIENT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the client identity from request headers
///
/// Order: trusted client-IP header, then the first entry of
/// `X-Forwarded-For`, else `"unknown"`. Empty header values count as absent.
///
/// ## Arguments
/// * `headers` - HTTP request headers
///
/// ## Returns
/// The advisory [`ClientIdentity`]; never fails
pub fn extract_client_identity(headers: &HeaderMap) -> ClientIdentity {
    if let Some(ip) = header_str(headers, TRUSTED_CLIENT_IP_HEADER) {
        return ClientIdentity::new(ip);
    }

    if let Some(xff) = header_str(headers, FORWARDED_FOR_HEADER) {
        if let Some(first) = xff.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return ClientIdentity::new(first);
        }
    }

    ClientIdentity::unknown()
}

/// User-Agent header, or `"unknown"` when missing or not valid ASCII
pub fn extract_user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
