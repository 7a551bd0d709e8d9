//! Error types for quiz-store.

use quiz_types::{QuestionId, ValidationError};
use std::path::PathBuf;

/// Storage layer errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The question was rejected before anything was written.
    #[error("invalid question: {0}")]
    Validation(#[from] ValidationError),

    /// Stored rows do not form a valid question.
    #[error("corrupt question {id}: {reason}")]
    Corrupt {
        /// The affected question.
        id: QuestionId,
        /// What is wrong with it.
        reason: String,
    },

    /// Database path error.
    #[error("invalid database path: {path}")]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
    },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_converts() {
        let err: StorageError = ValidationError::MissingId.into();
        assert!(matches!(err, StorageError::Validation(ValidationError::MissingId)));
        assert_eq!(
            err.to_string(),
            "invalid question: question has no server-assigned id"
        );
    }

    #[test]
    fn corrupt_display_names_question() {
        let err = StorageError::Corrupt {
            id: QuestionId::new(3),
            reason: "no answers".into(),
        };
        assert_eq!(err.to_string(), "corrupt question 3: no answers");
    }
}
