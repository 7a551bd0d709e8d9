//! Classification of question-bank responses.

/// How the sync layer treats a completed HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseClass {
    /// Status below 400.
    Success,
    /// Status 400..=499: a business answer. "No result" for reads,
    /// terminal for submissions.
    ClientRejection {
        /// The HTTP status code.
        status: u16,
    },
    /// Status 500 and above, or no response at all. Handled exactly like
    /// being offline.
    ConnectivityFailure,
}

impl ResponseClass {
    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            0..=399 => Self::Success,
            400..=499 => Self::ClientRejection { status },
            _ => Self::ConnectivityFailure,
        }
    }

    /// True for [`ResponseClass::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
