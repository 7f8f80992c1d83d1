//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod admin_guard;
pub mod config;
pub mod flash_sale_guard;
