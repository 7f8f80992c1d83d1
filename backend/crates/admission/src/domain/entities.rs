//! Domain Entities
//!
//! Persisted admission state. Both records are plain JSON documents so that
//! any store speaking strings can hold them.

use serde::{Deserialize, Serialize};

/// Admin-portal attempt record, one per client identity
///
/// Missing fields read as zero / empty so that partially written records
/// still decode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttemptRecord {
    pub attempts: u32,
    /// Epoch milliseconds of the most recent attempt
    pub last_attempt_time: i64,
    pub user_agent: String,
}

impl AttemptRecord {
    pub fn new(attempts: u32, last_attempt_time: i64, user_agent: impl Into<String>) -> Self {
        Self {
            attempts,
            last_attempt_time,
            user_agent: user_agent.into(),
        }
    }
}

/// Flash-sale window counter
///
/// The cache entry holding it expires with the window; there is no other
/// reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowCounter {
    pub count: u32,
    /// Epoch milliseconds of the write
    pub timestamp: i64,
}

impl WindowCounter {
    pub fn new(count: u32, timestamp: i64) -> Self {
        Self { count, timestamp }
    }

    /// Parse a cached counter body
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn to_body(&self) -> String {
        format!(r#"{{"count":{},"timestamp":{}}}"#, self.count, self.timestamp)
    }
}
