//! Domain Services
//!
//! Pure admission logic. No I/O, no clock: callers pass `now`.

use crate::domain::entities::AttemptRecord;
use crate::domain::value_objects::{AdminDecision, FlashSaleDecision, WindowObservation};
use platform::rate_limit::RateLimitConfig;
use std::time::Duration;

/// Gap after which the admin attempt counter starts over
pub const ATTEMPT_RESET_MS: i64 = 300_000;

/// Attempt number from which admin-portal requests are blocked
pub const ATTEMPT_BLOCK_THRESHOLD: u32 = 3;

/// Lifetime of a stored attempt record
pub const ATTEMPT_RECORD_TTL: Duration = Duration::from_secs(3600);

/// Record the current attempt on top of the previous record
///
/// A gap strictly greater than [`ATTEMPT_RESET_MS`] resets the counter; the
/// current attempt always counts, blocked or not.
pub fn next_attempt(
    previous: Option<&AttemptRecord>,
    now_ms: i64,
    user_agent: &str,
) -> AttemptRecord {
    let (mut attempts, last_attempt_time) = previous
        .map(|r| (r.attempts, r.last_attempt_time))
        .unwrap_or((0, 0));

    if now_ms - last_attempt_time > ATTEMPT_RESET_MS {
        attempts = 0;
    }

    AttemptRecord::new(attempts.saturating_add(1), now_ms, user_agent)
}

/// Warn below the threshold, block at or above it
pub fn decide_admin(attempts: u32) -> AdminDecision {
    if attempts >= ATTEMPT_BLOCK_THRESHOLD {
        AdminDecision::Block { attempts }
    } else {
        AdminDecision::Warn {
            attempts,
            remaining: ATTEMPT_BLOCK_THRESHOLD - attempts,
        }
    }
}

/// Count already spent in the current window
///
/// An unreadable counter counts as one request, never zero, so a corrupt
/// entry cannot reopen the window.
pub fn observed_count(observation: WindowObservation) -> u32 {
    match observation {
        WindowObservation::Absent => 0,
        WindowObservation::Counter(count) => count,
        WindowObservation::Unreadable => 1,
    }
}

/// Decide a flash-sale request from what the window cache held
pub fn decide_flash_sale(
    observation: WindowObservation,
    rate_limit: &RateLimitConfig,
) -> FlashSaleDecision {
    let result = rate_limit.evaluate(observed_count(observation));

    if result.allowed {
        FlashSaleDecision::Allow {
            request_count: result.request_count,
            limit: rate_limit.max_requests,
            remaining: result.remaining,
        }
    } else {
        FlashSaleDecision::Block {
            request_count: result.request_count,
            limit: rate_limit.max_requests,
            retry_after_secs: rate_limit.window_secs(),
        }
    }
}
