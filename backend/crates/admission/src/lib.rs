//! Admission Control Module
//!
//! Clean Architecture structure:
//! - `domain/` - Attempt and window counting rules, repository traits
//! - `application/` - Admin-portal and flash-sale guard use cases
//! - `infra/` - KV store and edge cache backed repository
//! - `presentation/` - Middleware, origin proxy handler, response synthesis
//!
//! ## Admission Model
//! - Every decision is keyed by the advisory client identity (proxy headers)
//! - Admin-portal guard: attempt counter with a 5 minute reset, block from the
//!   3rd attempt; blocked attempts still count
//! - Flash-sale guard: fixed window whose lifetime is the cached counter's
//!   `max-age`; denials never renew the window
//! - Any storage failure fails open: the request is forwarded and marked

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AdmissionConfig;
pub use error::{AdmissionError, AdmissionResult};
pub use infra::edge::EdgeAdmissionRepository;
pub use presentation::router::admission_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};
