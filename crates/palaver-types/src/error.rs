use thiserror::Error;

use crate::validate::ValidationErrors;

/// Failures of the participant and message operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationErrors),

    #[error("participant {0:?} already exists")]
    Conflict(String),

    /// The claimed sender is not a registered participant.
    #[error("sender {0:?} is not a registered participant")]
    Unauthorized(String),

    /// The requester does not own the message.
    #[error("only the sender may delete this message")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("store failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl ChatError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(ValidationErrors(vec![message.into()]))
    }
}
