//! Presentation Layer
//!
//! HTTP handlers, DTOs, bearer middleware and routers.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
