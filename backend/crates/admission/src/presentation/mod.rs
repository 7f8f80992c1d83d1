//! Presentation Layer
//!
//! Admission middleware, the origin proxy handler and response synthesis.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod synthesizer;
