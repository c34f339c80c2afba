//! Error types for the metadata review workflow

use crate::workflow::WorkflowState;
use thiserror::Error;

/// Preconditions checked before any service call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Save the block before asking for AI metadata")]
    NotSaved,

    #[error("Add some text to the block before asking for AI metadata")]
    NoText,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The service could not be reached or failed; state was restored
    #[error("Metadata service request failed: {0}")]
    Transport(String),

    /// The service answered with an explicit error body
    #[error("Metadata service reported an error: {0}")]
    Service(String),

    #[error("Cannot {action} while {from}")]
    InvalidTransition {
        from: WorkflowState,
        action: &'static str,
    },

    #[error("Field {0} is not part of the current review")]
    UnknownField(String),
}

impl WorkflowError {
    pub(crate) fn transport(e: anyhow::Error) -> Self {
        WorkflowError::Transport(format!("{:#}", e))
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
