//! Application Configuration
//!
//! Configuration for the admission application layer.

use platform::rate_limit::RateLimitConfig;

/// Which guard a request path falls under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    AdminPortal,
    FlashSale,
}

/// Admission application configuration
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    /// Path prefix guarded by the attempt counter
    pub admin_path_prefix: String,
    /// Off-site redirect target for blocked admin-portal requests
    pub admin_block_redirect_url: String,
    /// Path prefix guarded by the window counter
    pub flash_sale_path_prefix: String,
    /// Flash-sale threshold and window
    pub flash_sale_rate_limit: RateLimitConfig,
    /// Tag baked into counter cache URLs; bumping it invalidates all windows
    pub flash_sale_cache_version: String,
    /// Synthetic origin under which counters are cached
    pub flash_sale_cache_base_url: String,
    /// `X-Protected-By` value on throttle pages
    pub protected_by: String,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            admin_path_prefix: "/admin-portal/".to_string(),
            admin_block_redirect_url: "https://demo.oskarcode.com/".to_string(),
            flash_sale_path_prefix: "/flash-sale".to_string(),
            flash_sale_rate_limit: RateLimitConfig::default(),
            flash_sale_cache_version: "v1".to_string(),
            flash_sale_cache_base_url: "https://flash-sale-cache.internal".to_string(),
            protected_by: "Edge-Admission-Gateway".to_string(),
        }
    }
}

impl AdmissionConfig {
    /// Guard for a request path; the admin prefix is checked first
    pub fn guard_for(&self, path: &str) -> Option<GuardKind> {
        if path.starts_with(&self.admin_path_prefix) {
            Some(GuardKind::AdminPortal)
        } else if path.starts_with(&self.flash_sale_path_prefix) {
            Some(GuardKind::FlashSale)
        } else {
            None
        }
    }

    /// Cache URL of an identity's window counter
    pub fn window_cache_url(&self, identity: &str) -> String {
        format!(
            "{}/{}_flash_sale_{}",
            self.flash_sale_cache_base_url.trim_end_matches('/'),
            self.flash_sale_cache_version,
            identity
        )
    }
}
