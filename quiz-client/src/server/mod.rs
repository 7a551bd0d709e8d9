//! Question-bank service abstraction.
//!
//! The proxy talks to the remote question bank through the [`QuizServer`]
//! trait: one request in, one status + body out. Anything that prevents a
//! status from arriving at all is a [`TransportError`].
//!
//! Implementations:
//! - [`HttpServer`] - reqwest client against a base URL
//! - [`MockServer`] - scripted responses for tests
//!
//! # Example
//!
//! ```ignore
//! let server = MockServer::new();
//! server.queue_response(200, r#"{"id": 1, "question": "?", ...}"#);
//! let response = server.send(&OutboundRequest::get("/quizquestions/random")).await?;
//! ```

mod http;
mod mock;

pub use http::HttpServer;
pub use mock::MockServer;

use async_trait::async_trait;
use quiz_types::{OutboundRequest, ServerResponse};
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete in time.
    #[error("request timeout")]
    Timeout,

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be read.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// The remote question bank.
#[async_trait]
pub trait QuizServer: Send + Sync {
    /// Perform one request.
    ///
    /// Any HTTP status (including 4xx and 5xx) is a successful exchange;
    /// classification is up to the caller.
    async fn send(&self, request: &OutboundRequest) -> Result<ServerResponse, TransportError>;
}

/// Session credential attached to every outbound request.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    /// Authorization scheme, e.g. `Tequila`.
    pub scheme: String,
    /// Opaque session identifier.
    pub session_id: String,
}

impl SessionCredential {
    /// Create a credential.
    pub fn new(scheme: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            session_id: session_id.into(),
        }
    }

    /// Value of the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme, self.session_id)
    }

    /// Attach the `Authorization` header to a request.
    pub fn authorize(&self, request: OutboundRequest) -> OutboundRequest {
        request.with_header("Authorization", self.header_value())
    }
}

impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredential")
            .field("scheme", &self.scheme)
            .field("session_id", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_header() {
        let credential = SessionCredential::new("Tequila", "abc123");
        assert_eq!(credential.header_value(), "Tequila abc123");

        let request = credential.authorize(OutboundRequest::get("/quizquestions/random"));
        assert_eq!(request.header("authorization"), Some("Tequila abc123"));
    }

    #[test]
    fn credential_debug_redacts_session() {
        let credential = SessionCredential::new("Tequila", "secret-session");
        let debug = format!("{credential:?}");
        assert!(debug.contains("Tequila"));
        assert!(!debug.contains("secret-session"));
    }
}
