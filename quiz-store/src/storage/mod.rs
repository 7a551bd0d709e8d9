//! Relational question storage.
//!
//! Schema:
//! - `questions(id PK, text, owner, solution_index)`
//! - `tags(tag, question_id, PK(tag, question_id))`
//! - `answers(question_id, text, index, PK(question_id, index))`

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StorageError;
use async_trait::async_trait;
use quiz_core::CompiledPredicate;
use quiz_types::{Question, QuestionId};

/// Trait for question storage backends.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Upsert a question with its tags and answers in one transaction.
    ///
    /// Tag and answer rows of a previous version are replaced. The
    /// question must carry a server-assigned id.
    async fn put(&self, question: &Question) -> Result<(), StorageError>;

    /// All questions satisfying a compiled tag predicate, ascending by id.
    ///
    /// Returns an empty list when nothing matches.
    async fn query_by_tag(
        &self,
        predicate: &CompiledPredicate,
    ) -> Result<Vec<Question>, StorageError>;

    /// A uniformly random stored question.
    async fn random_question(&self) -> Result<Option<Question>, StorageError>;

    /// Get a question by id.
    async fn get(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// Number of stored questions.
    async fn count(&self) -> Result<u64, StorageError>;

    /// Delete every row in every table.
    async fn clear(&self) -> Result<(), StorageError>;

    /// Drop and recreate the schema.
    async fn reset(&self) -> Result<(), StorageError>;
}
