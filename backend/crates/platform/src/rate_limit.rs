//! Rate Limiting Infrastructure
//!
//! Fixed-window counting where the window is the lifetime of a stored
//! counter: the counter is created by the first request, bumped by each
//! admitted request, and vanishes when its TTL elapses.

use std::time::Duration;

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests admitted in one window
    pub max_requests: u32,
    /// Window duration (also the counter TTL)
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 1,
            window: Duration::from_secs(10),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_secs(&self) -> u64 {
        self.window.as_secs()
    }

    /// Decide on the next request given the count already observed in the
    /// current window
    pub fn evaluate(&self, observed: u32) -> RateLimitResult {
        let request_count = observed.saturating_add(1);
        let allowed = request_count <= self.max_requests;
        RateLimitResult {
            allowed,
            request_count,
            remaining: self.max_requests.saturating_sub(request_count),
        }
    }
}

/// Rate limit check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Count including the request being decided
    pub request_count: u32,
    pub remaining: u32,
}
