//! Storage error types

use news_hub_core::CoreError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Author resolution failed: {0}")]
    AuthorResolution(String),

    #[error("Invalid post id '{id}': {reason}")]
    InvalidId { id: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CoreError> for StorageError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPostId { id, reason } => StorageError::InvalidId { id, reason },
            CoreError::MissingField(field) => {
                StorageError::Write(format!("missing required field {field}"))
            }
        }
    }
}
