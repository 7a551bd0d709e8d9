//! The quiz question record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{CodecError, QuestionId, ValidationError};

/// A multiple-choice quiz question.
///
/// JSON shape (as exchanged with the question bank):
///
/// ```json
/// {"id": 7, "question": "2+2?", "answers": ["3", "4"], "solution": 1,
///  "tags": ["math"], "owner": "alice"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Server-assigned identity (absent until the first accepted submission).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuestionId>,
    /// Body text.
    #[serde(rename = "question")]
    pub text: String,
    /// Answer texts, in display order.
    pub answers: Vec<String>,
    /// Zero-based index of the correct answer.
    pub solution: usize,
    /// Tags (unordered, unique).
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Owner identifier assigned by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl Question {
    /// Create a validated, not-yet-submitted question.
    pub fn new<A, T>(
        text: impl Into<String>,
        answers: A,
        solution: usize,
        tags: T,
    ) -> Result<Self, ValidationError>
    where
        A: IntoIterator,
        A::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let question = Self {
            id: None,
            text: text.into(),
            answers: answers.into_iter().map(Into::into).collect(),
            solution,
            tags: tags.into_iter().map(Into::into).collect(),
            owner: None,
        };
        question.validate()?;
        Ok(question)
    }

    /// Set the server-assigned id.
    pub fn with_id(mut self, id: impl Into<QuestionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Check the structural invariants of the question.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::BlankText);
        }
        if self.answers.is_empty() {
            return Err(ValidationError::NoAnswers);
        }
        if let Some(position) = self.answers.iter().position(|a| a.trim().is_empty()) {
            return Err(ValidationError::BlankAnswer { position });
        }
        if self.solution >= self.answers.len() {
            return Err(ValidationError::SolutionOutOfRange {
                solution: self.solution,
                answers: self.answers.len(),
            });
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(ValidationError::BlankTag);
        }
        Ok(())
    }

    /// Validate and require a server-assigned id.
    ///
    /// Only questions passing this check may enter the relational store.
    pub fn validate_storable(&self) -> Result<QuestionId, ValidationError> {
        self.validate()?;
        self.id.ok_or(ValidationError::MissingId)
    }

    /// Parse a question from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to the JSON representation.
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialized size in bytes, used for overlay cache accounting.
    pub fn byte_cost(&self) -> usize {
        match serde_json::to_vec(self) {
            Ok(bytes) => bytes.len(),
            Err(_) => {
                self.text.len()
                    + self.answers.iter().map(String::len).sum::<usize>()
                    + self.tags.iter().map(String::len).sum::<usize>()
                    + self.owner.as_ref().map_or(0, String::len)
            }
        }
    }

    /// Text of the correct answer.
    pub fn correct_answer(&self) -> Option<&str> {
        self.answers.get(self.solution).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question::new("2 + 2?", ["3", "4", "5"], 1, ["math", "easy"]).unwrap()
    }

    #[test]
    fn new_question_has_no_id() {
        let q = sample();
        assert!(q.id.is_none());
        assert_eq!(q.correct_answer(), Some("4"));
    }

    #[test]
    fn solution_out_of_range_rejected() {
        let err = Question::new("q", ["a", "b"], 2, ["t"]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::SolutionOutOfRange {
                solution: 2,
                answers: 2
            }
        );
    }

    #[test]
    fn blank_fields_rejected() {
        assert_eq!(
            Question::new("  ", ["a"], 0, ["t"]).unwrap_err(),
            ValidationError::BlankText
        );
        assert_eq!(
            Question::new("q", Vec::<String>::new(), 0, ["t"]).unwrap_err(),
            ValidationError::NoAnswers
        );
        assert_eq!(
            Question::new("q", ["a", " "], 0, ["t"]).unwrap_err(),
            ValidationError::BlankAnswer { position: 1 }
        );
        assert_eq!(
            Question::new("q", ["a"], 0, [""]).unwrap_err(),
            ValidationError::BlankTag
        );
    }

    #[test]
    fn storable_requires_id() {
        let q = sample();
        assert_eq!(q.validate_storable(), Err(ValidationError::MissingId));
        let q = q.with_id(9);
        assert_eq!(q.validate_storable(), Ok(QuestionId::new(9)));
    }

    #[test]
    fn parses_server_json() {
        let json = r#"{"id": 7, "question": "Capital of France?",
            "answers": ["Paris", "Rome"], "solution": 0,
            "tags": ["geo", "geo", "europe"], "owner": "alice"}"#;
        let q = Question::from_json(json).unwrap();

        assert_eq!(q.id, Some(QuestionId::new(7)));
        assert_eq!(q.text, "Capital of France?");
        assert_eq!(q.tags.len(), 2);
        assert_eq!(q.owner.as_deref(), Some("alice"));
    }

    #[test]
    fn unsubmitted_question_omits_id_in_json() {
        let json = sample().to_json().unwrap();
        assert!(!json.contains("\"id\""));
        assert!(json.contains("\"question\":\"2 + 2?\""));
        assert!(json.contains("\"solution\":1"));
    }

    #[test]
    fn byte_cost_tracks_serialized_size() {
        let q = sample();
        assert_eq!(q.byte_cost(), q.to_json().unwrap().len());

        let bigger = Question::new("2 + 2? Think carefully.", ["3", "4"], 1, ["math"]).unwrap();
        assert!(bigger.byte_cost() > 0);
    }
}
