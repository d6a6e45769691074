//! Error types for the core crate

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid post id '{id}': {reason}")]
    InvalidPostId { id: String, reason: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
