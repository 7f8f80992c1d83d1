//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Client identification from proxy headers
//! - Cryptographic utilities (SHA-256, base64url, PKCE)
//! - Clock abstraction (system and manual clocks)
//! - Key-value store and edge cache abstractions with in-memory backends
//! - Windowed rate limit configuration and evaluation
//! - Background task tracking for fire-and-forget writes
//! - Upstream HTTP forwarding (origin and backend dispatch)

pub mod cache;
pub mod client;
pub mod clock;
pub mod crypto;
pub mod kv;
pub mod rate_limit;
pub mod tasks;
pub mod upstream;
