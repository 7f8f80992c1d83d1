//! Infrastructure Layer - KV repository and identity provider client

pub mod idp;
pub mod kv;
