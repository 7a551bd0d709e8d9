//! Messages exchanged with the question-bank service.
//!
//! Endpoints:
//! - `GET /quizquestions/random` -> [`Question`]
//! - `POST /search` with [`SearchRequest`] -> [`SearchPage`]
//! - `POST /quizquestions/` with [`Question`] -> [`Question`] (now carrying an id)

use serde::{Deserialize, Serialize};

use crate::{CodecError, Question, SearchCursor};

/// HTTP method of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
}

/// A fully built request, ready to hand to a transport.
///
/// This is also the payload stored for deferred submissions, so it must
/// carry everything needed to replay the request verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the service base URL, e.g. `/search`.
    pub path: String,
    /// Header name/value pairs, in insertion order.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Request body, if any.
    #[serde(default)]
    pub body: Option<String>,
}

impl OutboundRequest {
    /// A GET request without body.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST request with a JSON body and `Content-type: application/json`.
    pub fn post_json<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, CodecError> {
        Ok(Self {
            method: Method::Post,
            path: path.into(),
            headers: vec![("Content-type".to_string(), "application/json".to_string())],
            body: Some(serde_json::to_string(body)?),
        })
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value (case-insensitive name match).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw status and body returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body (may be empty).
    pub body: String,
}

impl ServerResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query string, verbatim.
    pub query: String,
    /// Cursor of the page to continue from (absent for the first page).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl SearchRequest {
    /// First-page request.
    pub fn first(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            from: None,
        }
    }

    /// Follow-up request continuing from `cursor`.
    pub fn continue_from(query: impl Into<String>, cursor: &SearchCursor) -> Self {
        Self {
            query: query.into(),
            from: Some(cursor.as_str().to_string()),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Matching questions, in server order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Raw pagination cursor.
    #[serde(default)]
    pub next: Option<String>,
}

impl SearchPage {
    /// Parse a page from its JSON body.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The cursor for the following page, if any.
    pub fn cursor(&self) -> Option<SearchCursor> {
        SearchCursor::parse(self.next.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_search_request_omits_from() {
        let body = serde_json::to_string(&SearchRequest::first("math")).unwrap();
        assert_eq!(body, r#"{"query":"math"}"#);
    }

    #[test]
    fn search_body_escapes_query() {
        let req = OutboundRequest::post_json("/search", &SearchRequest::first("a\" }")).unwrap();
        let body = req.body.unwrap();
        let parsed: SearchRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.query, "a\" }");
    }

    #[test]
    fn follow_up_request_carries_cursor() {
        let cursor = SearchCursor::parse(Some("page-2")).unwrap();
        let body = serde_json::to_string(&SearchRequest::continue_from("math", &cursor)).unwrap();
        assert_eq!(body, r#"{"query":"math","from":"page-2"}"#);
    }

    #[test]
    fn post_json_sets_content_type() {
        let req = OutboundRequest::post_json("/search", &SearchRequest::first("x"))
            .unwrap()
            .with_header("Authorization", "Tequila abc");
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("Authorization"), Some("Tequila abc"));
    }

    #[test]
    fn page_with_null_next_is_exhausted() {
        let page = SearchPage::from_json(r#"{"questions": [], "next": null}"#).unwrap();
        assert!(page.questions.is_empty());
        assert!(page.cursor().is_none());

        let page = SearchPage::from_json(r#"{"questions": [], "next": "null"}"#).unwrap();
        assert!(page.cursor().is_none());
    }

    #[test]
    fn page_parses_questions() {
        let json = r#"{"questions": [
            {"id": 1, "question": "q1", "answers": ["a", "b"], "solution": 0, "tags": ["t"], "owner": "o"},
            {"id": 2, "question": "q2", "answers": ["a", "b"], "solution": 1, "tags": ["t"], "owner": "o"}
        ], "next": "c2"}"#;
        let page = SearchPage::from_json(json).unwrap();
        assert_eq!(page.questions.len(), 2);
        assert_eq!(page.cursor().unwrap().as_str(), "c2");
    }
}
