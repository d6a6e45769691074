//! Storage layer for News Hub
//!
//! Provides persistence for posts behind a single contract.
//! Supports in-memory (for development), PostgreSQL and MongoDB backends.

pub mod deadline;
pub mod error;
pub mod factory;
pub mod memory;
pub mod traits;

#[cfg(feature = "mongo")]
pub mod mongo;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use deadline::DeadlineStorage;
pub use error::StorageError;
pub use factory::{open, BackendConfig};
pub use memory::InMemoryStorage;
pub use traits::PostStorage;

#[cfg(feature = "mongo")]
pub use mongo::{MongoConfig, MongoStorage};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresConfig, PostgresStorage};
