//! Error types for quizsync data.

use thiserror::Error;

/// A question was rejected before anything was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Question text is empty or whitespace.
    #[error("question text is blank")]
    BlankText,

    /// The question has no answers.
    #[error("question has no answers")]
    NoAnswers,

    /// An answer is empty or whitespace.
    #[error("answer {position} is blank")]
    BlankAnswer {
        /// Zero-based position of the offending answer.
        position: usize,
    },

    /// The solution index does not point at an answer.
    #[error("solution index {solution} out of range for {answers} answers")]
    SolutionOutOfRange {
        /// The stored solution index.
        solution: usize,
        /// Number of answers.
        answers: usize,
    },

    /// A tag is empty or whitespace.
    #[error("tag is blank")]
    BlankTag,

    /// The question has no server-assigned id and cannot be stored.
    #[error("question has no server-assigned id")]
    MissingId,
}

/// Encoding or decoding failed.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// MessagePack serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[source] rmp_serde::encode::Error),

    /// MessagePack deserialization failed.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] rmp_serde::decode::Error),

    /// The bytes are not a queue file or are truncated.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// The file was written by a newer format version.
    #[error("unsupported format version {found} (max supported {max_supported})")]
    UnsupportedVersion {
        /// Version found in the header.
        found: u32,
        /// Highest version this build understands.
        max_supported: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ValidationError::SolutionOutOfRange {
            solution: 4,
            answers: 2,
        };
        assert_eq!(
            err.to_string(),
            "solution index 4 out of range for 2 answers"
        );
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ValidationError>();
        assert_send_sync::<CodecError>();
    }
}
