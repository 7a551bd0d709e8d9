//! Identity and paging types for quizsync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identity of a question.
///
/// Questions only get an id once the question bank has accepted them;
/// locally authored questions carry `None` until then.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(i64);

impl QuestionId {
    /// Create a QuestionId from its numeric value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the numeric value of this QuestionId.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for QuestionId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

/// Opaque pagination token returned by the search endpoint.
///
/// The server signals exhaustion with a missing cursor, an empty string,
/// or the literal string `"null"`; [`SearchCursor::parse`] folds all three
/// into `None`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchCursor(String);

impl SearchCursor {
    /// Interpret a raw `next` value from the server.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw {
            None => None,
            Some(s) if s.is_empty() || s == "null" => None,
            Some(s) => Some(Self(s.to_string())),
        }
    }

    /// Get the token as sent back to the server.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SearchCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SearchCursor({})", self.0)
    }
}

/// Correlation token tying a queued submission to its eventual outcome.
///
/// UUID v4 format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(uuid::Uuid);

impl CorrelationId {
    /// Create a new random CorrelationId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CorrelationId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_id_ordering() {
        assert!(QuestionId::new(1) < QuestionId::new(2));
    }

    #[test]
    fn question_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&QuestionId::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn cursor_exhaustion_markers() {
        assert!(SearchCursor::parse(None).is_none());
        assert!(SearchCursor::parse(Some("")).is_none());
        assert!(SearchCursor::parse(Some("null")).is_none());
        assert_eq!(
            SearchCursor::parse(Some("abc")).map(|c| c.as_str().to_string()),
            Some("abc".to_string())
        );
    }

    #[test]
    fn correlation_id_is_uuid_v4() {
        let id = CorrelationId::new();
        assert_eq!(id.as_uuid().get_version_num(), 4);
        assert_ne!(id, CorrelationId::new());
    }
}
