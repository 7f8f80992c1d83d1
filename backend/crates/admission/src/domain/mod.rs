//! Domain Layer - Admission rules and entities
//!
//! This layer contains:
//! - Domain entities (AttemptRecord, WindowCounter)
//! - Domain value objects (admission decisions, window observations)
//! - Domain services (pure counting and threshold logic)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
