//! HTTP question bank backed by reqwest.

use super::{QuizServer, TransportError};
use async_trait::async_trait;
use quiz_types::{Method, OutboundRequest, ServerResponse};
use std::time::Duration;

/// Question bank reached over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpServer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpServer {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The service base URL (without trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn map_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::ConnectionFailed(error.to_string())
    }
}

#[async_trait]
impl QuizServer for HttpServer {
    async fn send(&self, request: &OutboundRequest) -> Result<ServerResponse, TransportError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        tracing::debug!(method = ?request.method, %url, "sending request");
        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;

        tracing::debug!(status, bytes = body.len(), "response received");
        Ok(ServerResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request text.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                raw.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + length || n == 0 {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&raw).to_string()
        });

        (base, handle)
    }

    #[test]
    fn joins_paths() {
        let server = HttpServer::new("https://example.org/", Duration::from_secs(1)).unwrap();
        assert_eq!(server.base_url(), "https://example.org");
        assert_eq!(server.url("/search"), "https://example.org/search");
        assert_eq!(server.url("search"), "https://example.org/search");
    }

    #[tokio::test]
    async fn posts_body_and_headers() {
        let (base, handle) = serve_once("200 OK", r#"{"questions":[],"next":null}"#).await;
        let server = HttpServer::new(&base, Duration::from_secs(5)).unwrap();

        let search = quiz_types::SearchRequest::first("math");
        let request = OutboundRequest::post_json("/search", &search)
            .unwrap()
            .with_header("Authorization", "Tequila abc");
        let response = server.send(&request).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"questions":[],"next":null}"#);

        let raw = handle.await.unwrap();
        assert!(raw.starts_with("POST /search HTTP/1.1"));
        assert!(raw.to_ascii_lowercase().contains("authorization: tequila abc"));
        assert!(raw.contains(r#"{"query":"math"}"#));
    }

    #[tokio::test]
    async fn error_status_is_not_a_transport_error() {
        let (base, handle) = serve_once("503 Service Unavailable", "").await;
        let server = HttpServer::new(&base, Duration::from_secs(5)).unwrap();

        let response = server
            .send(&OutboundRequest::get("/quizquestions/random"))
            .await
            .unwrap();
        assert_eq!(response.status, 503);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let server = HttpServer::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let result = server.send(&OutboundRequest::get("/quizquestions/random")).await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    }
}
