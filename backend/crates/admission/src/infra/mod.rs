//! Infrastructure Layer - Store-backed repository

pub mod edge;
