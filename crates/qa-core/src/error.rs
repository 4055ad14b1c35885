//! Error types for the Q&A service

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QaError>;

/// Entity kind named by a [`QaError::NotFound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Question,
    Answer,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Question => write!(f, "Question"),
            Entity::Answer => write!(f, "Answer"),
        }
    }
}

#[derive(Error, Debug)]
pub enum QaError {
    /// The entity, or the parent an answer points at, does not exist
    #[error("{0} not found")]
    NotFound(Entity),

    /// Missing required field, malformed body or non-numeric identifier.
    /// The message is shown to the client verbatim.
    #[error("{0}")]
    ValidationFailed(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Anything the storage layer could not classify
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl QaError {
    pub fn validation(message: impl Into<String>) -> Self {
        QaError::ValidationFailed(message.into())
    }

    pub fn storage(err: impl fmt::Display) -> Self {
        QaError::StorageFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_single_line() {
        assert_eq!(
            QaError::NotFound(Entity::Question).to_string(),
            "Question not found"
        );
        assert_eq!(
            QaError::NotFound(Entity::Answer).to_string(),
            "Answer not found"
        );
        assert_eq!(
            QaError::validation("Text is required").to_string(),
            "Text is required"
        );
        assert_eq!(
            QaError::storage("disk I/O error").to_string(),
            "Storage failure: disk I/O error"
        );
    }
}
