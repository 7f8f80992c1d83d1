//! Gateway configuration
//!
//! Read once at startup from the environment (after `.env` is loaded).
//! Malformed values are startup errors; missing OAuth settings only disable
//! the OAuth routes.

use admission::AdmissionConfig;
use anyhow::{Context, bail};
use oauth::OAuthConfig;
use platform::kv::KvBindingKind;
use platform::rate_limit::RateLimitConfig;
use std::net::SocketAddr;
use std::str::FromStr;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8787";
const DEFAULT_EDGE_CACHE_CAPACITY: usize = 100_000;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    /// Origin behind the admission guards
    pub origin_url: String,
    /// Backend behind the protected resource paths
    pub backend_api_url: String,
    pub kv_binding: KvBindingKind,
    /// Maximum window counters held before early eviction
    pub edge_cache_capacity: usize,
    /// CORS allow-list; empty means any origin
    pub frontend_origins: Vec<String>,
    pub admission: AdmissionConfig,
    pub oauth: OAuthConfig,
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let listen_addr: SocketAddr =
            parse_or(&get, "LISTEN_ADDR", DEFAULT_LISTEN_ADDR.parse::<SocketAddr>()?)?;
        let origin_url = get("ORIGIN_URL").context("ORIGIN_URL must be set")?;
        let backend_api_url = get("BACKEND_API_URL").context("BACKEND_API_URL must be set")?;

        let kv_binding = match get("KV_BINDING") {
            Some(raw) => raw
                .parse::<KvBindingKind>()
                .map_err(|e| anyhow::anyhow!("KV_BINDING: {e}"))?,
            None => KvBindingKind::default(),
        };

        let edge_cache_capacity =
            parse_or(&get, "EDGE_CACHE_CAPACITY", DEFAULT_EDGE_CACHE_CAPACITY)?;

        let frontend_origins = get("FRONTEND_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let defaults = AdmissionConfig::default();
        let default_limit = RateLimitConfig::default();
        let max_requests = parse_or(&get, "FLASH_SALE_MAX_REQUESTS", default_limit.max_requests)?;
        let window_secs = parse_or(
            &get,
            "FLASH_SALE_WINDOW_SECONDS",
            default_limit.window_secs(),
        )?;
        if max_requests == 0 || window_secs == 0 {
            bail!("FLASH_SALE_MAX_REQUESTS and FLASH_SALE_WINDOW_SECONDS must be positive");
        }

        let admission = AdmissionConfig {
            admin_path_prefix: get("ADMIN_PATH_PREFIX").unwrap_or(defaults.admin_path_prefix),
            admin_block_redirect_url: get("ADMIN_BLOCK_REDIRECT_URL")
                .unwrap_or(defaults.admin_block_redirect_url),
            flash_sale_path_prefix: get("FLASH_SALE_PATH_PREFIX")
                .unwrap_or(defaults.flash_sale_path_prefix),
            flash_sale_rate_limit: RateLimitConfig::new(max_requests, window_secs),
            flash_sale_cache_version: get("FLASH_SALE_CACHE_VERSION")
                .unwrap_or(defaults.flash_sale_cache_version),
            ..defaults
        };

        let oauth = OAuthConfig {
            public_base_url: get("PUBLIC_BASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            ..OAuthConfig::new(
                get("ACCESS_CLIENT_ID").unwrap_or_default(),
                get("ACCESS_CLIENT_SECRET").unwrap_or_default(),
                get("ACCESS_AUTHORIZATION_URL").unwrap_or_default(),
                get("ACCESS_TOKEN_URL").unwrap_or_default(),
            )
        };

        Ok(Self {
            listen_addr,
            origin_url,
            backend_api_url,
            kv_binding,
            edge_cache_capacity,
            frontend_origins,
            admission,
            oauth,
        })
    }
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}: invalid value {raw:?}: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("ORIGIN_URL", "https://origin.test"),
        ("BACKEND_API_URL", "https://backend.test"),
    ];

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.listen_addr.to_string(), "0.0.0.0:8787");
        assert_eq!(config.kv_binding, KvBindingKind::Memory);
        assert_eq!(config.edge_cache_capacity, 100_000);
        assert!(config.frontend_origins.is_empty());
        assert_eq!(config.admission.admin_path_prefix, "/admin-portal/");
        assert_eq!(config.admission.flash_sale_rate_limit.max_requests, 1);
        assert_eq!(config.admission.flash_sale_rate_limit.window_secs(), 10);
        assert!(!config.oauth.is_configured());
        assert_eq!(config.oauth.public_base_url, None);
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("LISTEN_ADDR", "127.0.0.1:9000"),
            ("KV_BINDING", "none"),
            ("EDGE_CACHE_CAPACITY", "500"),
            ("FRONTEND_ORIGINS", "https://a.test, https://b.test,"),
            ("FLASH_SALE_MAX_REQUESTS", "5"),
            ("FLASH_SALE_WINDOW_SECONDS", "30"),
            ("FLASH_SALE_CACHE_VERSION", "v2"),
            ("PUBLIC_BASE_URL", "https://edge.test/"),
            ("ACCESS_CLIENT_ID", "id"),
            ("ACCESS_CLIENT_SECRET", "secret"),
            ("ACCESS_AUTHORIZATION_URL", "https://idp.test/authorize"),
            ("ACCESS_TOKEN_URL", "https://idp.test/token"),
        ]);
        let config = GatewayConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.kv_binding, KvBindingKind::None);
        assert_eq!(config.edge_cache_capacity, 500);
        assert_eq!(config.frontend_origins, vec!["https://a.test", "https://b.test"]);
        assert_eq!(config.admission.flash_sale_rate_limit, RateLimitConfig::new(5, 30));
        assert_eq!(config.admission.flash_sale_cache_version, "v2");
        assert_eq!(config.oauth.public_base_url.as_deref(), Some("https://edge.test"));
        assert!(config.oauth.is_configured());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("FLASH_SALE_WINDOW_SECONDS", "ten"));
        assert!(GatewayConfig::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("FLASH_SALE_MAX_REQUESTS", "0"));
        assert!(GatewayConfig::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("KV_BINDING", "redis"));
        assert!(GatewayConfig::from_lookup(lookup(&pairs)).is_err());

        assert!(GatewayConfig::from_lookup(lookup(&REQUIRED[..1])).is_err());
    }
}
