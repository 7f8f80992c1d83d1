//! Domain Value Objects
//!
//! Outcomes of the two admission variants.

/// Admin-portal guard outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminDecision {
    /// Forward, with a warning
    Warn { attempts: u32, remaining: u32 },
    /// Redirect away; `attempts` is the true cumulative count
    Block { attempts: u32 },
}

impl AdminDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, AdminDecision::Block { .. })
    }
}

/// What the window cache held for an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowObservation {
    /// No live counter (first request, or the window lapsed)
    Absent,
    Counter(u32),
    /// A counter exists but its body could not be parsed
    Unreadable,
}

/// Flash-sale guard outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashSaleDecision {
    Allow {
        request_count: u32,
        limit: u32,
        remaining: u32,
    },
    Block {
        request_count: u32,
        limit: u32,
        retry_after_secs: u64,
    },
}
