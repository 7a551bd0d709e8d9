//! Outcome notifications emitted by the sync proxy.

use quiz_types::{CorrelationId, Question, ValidationError};
use std::fmt;

/// Why a request produced no question or was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Nothing matched; a normal outcome.
    NotFound,
    /// The server answered 4xx.
    ClientRejection {
        /// The HTTP status code.
        status: u16,
    },
    /// The server could not be reached and there was no offline answer.
    Connectivity,
    /// The question was malformed.
    Validation(ValidationError),
    /// Local persistence failed.
    Storage(String),
    /// The server answered with a body that could not be decoded.
    InvalidResponse(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("not found"),
            Self::ClientRejection { status } => write!(f, "rejected by server (status {status})"),
            Self::Connectivity => f.write_str("server unreachable"),
            Self::Validation(e) => write!(f, "invalid question: {e}"),
            Self::Storage(e) => write!(f, "storage failure: {e}"),
            Self::InvalidResponse(e) => write!(f, "invalid server response: {e}"),
        }
    }
}

/// Events emitted to the application layer.
///
/// Every request ends with exactly one of `QuestionReady`,
/// `NothingAvailable`, `SubmissionAccepted` or `SubmissionRejected`. The
/// connectivity events are emitted in addition, whenever the proxy's view
/// of the network changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A question is ready to display.
    QuestionReady(Question),
    /// No question could be produced.
    NothingAvailable(FailureKind),
    /// A submission was accepted.
    SubmissionAccepted {
        /// Token identifying the submission.
        correlation: CorrelationId,
        /// The question as stored by the server, or as submitted if deferred.
        question: Question,
        /// True if it was queued for later delivery.
        deferred: bool,
    },
    /// A submission was refused and will not be retried.
    SubmissionRejected {
        /// Token identifying the submission.
        correlation: CorrelationId,
        /// Why it was refused.
        kind: FailureKind,
    },
    /// The server became reachable again.
    ConnectivityRegained,
    /// The server stopped being reachable.
    ConnectivityLost,
}

impl Notification {
    /// The question carried by this notification, if any.
    pub fn question(&self) -> Option<&Question> {
        match self {
            Self::QuestionReady(q) | Self::SubmissionAccepted { question: q, .. } => Some(q),
            _ => None,
        }
    }

    /// True for the connectivity events.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::ConnectivityRegained | Self::ConnectivityLost)
    }
}
