//! Mock question bank for testing.
//!
//! Allows queueing responses and capturing sent requests for verification.

use super::{QuizServer, TransportError};
use async_trait::async_trait;
use quiz_types::{OutboundRequest, ServerResponse};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock question bank for testing.
///
/// Responses are returned in the order they were queued. Sending with an
/// empty queue fails like an unreachable server.
#[derive(Debug, Default)]
pub struct MockServer {
    inner: Arc<Mutex<MockServerInner>>,
}

#[derive(Debug, Default)]
struct MockServerInner {
    sent_requests: Vec<OutboundRequest>,
    response_queue: VecDeque<ServerResponse>,
    fail_next_send: Option<String>,
    unreachable: bool,
}

impl MockServer {
    /// Create a new mock server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `send()` call.
    pub fn queue_response(&self, status: u16, body: impl Into<String>) {
        self.lock()
            .response_queue
            .push_back(ServerResponse::new(status, body));
    }

    /// Get all requests that were sent.
    pub fn sent_requests(&self) -> Vec<OutboundRequest> {
        self.lock().sent_requests.clone()
    }

    /// Get the last request that was sent.
    pub fn last_sent(&self) -> Option<OutboundRequest> {
        self.lock().sent_requests.last().cloned()
    }

    /// Number of responses still queued.
    pub fn pending_responses(&self) -> usize {
        self.lock().response_queue.len()
    }

    /// Cause the next send() to fail with the given error.
    pub fn fail_next_send(&self, error: &str) {
        self.lock().fail_next_send = Some(error.to_string());
    }

    /// Make every send() fail until switched back.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Clear all state (requests, queue, failures).
    pub fn reset(&self) {
        *self.lock() = MockServerInner::default();
    }

    fn lock(&self) -> MutexGuard<'_, MockServerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for MockServer {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl QuizServer for MockServer {
    async fn send(&self, request: &OutboundRequest) -> Result<ServerResponse, TransportError> {
        let mut inner = self.lock();

        if inner.unreachable {
            return Err(TransportError::ConnectionFailed("server unreachable".into()));
        }

        // Check for forced failure
        if let Some(error) = inner.fail_next_send.take() {
            return Err(TransportError::ConnectionFailed(error));
        }

        inner.sent_requests.push(request.clone());
        inner
            .response_queue
            .pop_front()
            .ok_or_else(|| TransportError::ConnectionFailed("no response queued".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_queued_responses_in_order() {
        let server = MockServer::new();
        server.queue_response(200, "one");
        server.queue_response(404, "");

        let r1 = server.send(&OutboundRequest::get("/a")).await.unwrap();
        let r2 = server.send(&OutboundRequest::get("/b")).await.unwrap();

        assert_eq!(r1, ServerResponse::new(200, "one"));
        assert_eq!(r2.status, 404);
        assert_eq!(server.pending_responses(), 0);
    }

    #[tokio::test]
    async fn records_sent_requests() {
        let server = MockServer::new();
        server.queue_response(200, "");
        server.queue_response(200, "");

        server.send(&OutboundRequest::get("/first")).await.unwrap();
        server.send(&OutboundRequest::get("/second")).await.unwrap();

        let sent = server.sent_requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].path, "/first");
        assert_eq!(server.last_sent().unwrap().path, "/second");
    }

    #[tokio::test]
    async fn empty_queue_is_connection_failure() {
        let server = MockServer::new();
        let result = server.send(&OutboundRequest::get("/a")).await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn forced_failure_only_once() {
        let server = MockServer::new();
        server.queue_response(200, "ok");
        server.fail_next_send("reset by peer");

        assert!(server.send(&OutboundRequest::get("/a")).await.is_err());
        assert!(server.sent_requests().is_empty());

        // Next send should work and get the queued response
        let response = server.send(&OutboundRequest::get("/a")).await.unwrap();
        assert_eq!(response.body, "ok");
    }

    #[tokio::test]
    async fn unreachable_until_restored() {
        let server = MockServer::new();
        server.queue_response(200, "ok");
        server.set_unreachable(true);

        assert!(server.send(&OutboundRequest::get("/a")).await.is_err());
        assert!(server.send(&OutboundRequest::get("/a")).await.is_err());
        assert_eq!(server.pending_responses(), 1);

        server.set_unreachable(false);
        assert!(server.send(&OutboundRequest::get("/a")).await.is_ok());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let server1 = MockServer::new();
        let server2 = server1.clone();

        server1.queue_response(200, "");
        server2.send(&OutboundRequest::get("/a")).await.unwrap();

        assert_eq!(server1.sent_requests().len(), 1);
    }

    #[tokio::test]
    async fn reset_clears_all() {
        let server = MockServer::new();
        server.queue_response(200, "");
        server.send(&OutboundRequest::get("/a")).await.unwrap();
        server.queue_response(200, "");
        server.set_unreachable(true);

        server.reset();

        assert!(server.sent_requests().is_empty());
        assert_eq!(server.pending_responses(), 0);
        server.queue_response(200, "");
        assert!(server.send(&OutboundRequest::get("/a")).await.is_ok());
    }
}
