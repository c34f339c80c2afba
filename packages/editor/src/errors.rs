//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Durable content error: {0}")]
    Durable(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Durable(e.to_string())
    }
}

/// Errors raised when a value does not fit the block model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Difficulty must be between 0 and 10, got {0}")]
    DifficultyOutOfRange(i64),

    #[error("Field {field} expects {expected}")]
    WrongValueType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),

    #[error("Unknown metadata field: {0}")]
    UnknownField(String),

    #[error("Content of type {found} cannot be stored in a {expected} block")]
    ContentTypeMismatch { expected: String, found: String },
}
