//! Shared Kernel - Domain-crossing minimal core
//!
//! Vocabulary shared by the admission and OAuth crates:
//! - Unified error type and result alias
//! - Opaque identifier types for issued credentials
//!
//! Only things with the same meaning in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
