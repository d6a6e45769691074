//! Core domain models for News Hub
//!
//! This crate contains the shared data structures used across
//! every storage backend: the Post entity, its caller-facing
//! identity and the request shapes of the HTTP surface.

pub mod error;
pub mod models;

pub use error::CoreError;
pub use models::*;
