//! SQLite storage backend for quiz-store.

use super::QuestionStore;
use crate::error::StorageError;
use async_trait::async_trait;
use quiz_core::CompiledPredicate;
use quiz_types::{Question, QuestionId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

/// SQLite-based question storage.
///
/// Uses WAL mode for concurrent reads/writes.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a question database at `path`.
    pub async fn new(path: &Path) -> Result<Self, StorageError> {
        if path.as_os_str().is_empty() {
            return Err(StorageError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(StorageError::Database)?;

        let store = Self { pool };
        store.run_migrations().await?;
        tracing::debug!(path = %path.display(), "question store opened");
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(":memory:")
            .map_err(StorageError::Database)?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        // Every connection to ":memory:" is a separate database, so pin
        // the pool to one connection that never expires.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(StorageError::Database)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS questions (
                id INTEGER PRIMARY KEY,
                text TEXT NOT NULL,
                owner TEXT,
                solution_index INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tags (
                tag TEXT NOT NULL,
                question_id INTEGER NOT NULL,
                PRIMARY KEY (tag, question_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS answers (
                question_id INTEGER NOT NULL,
                text TEXT NOT NULL,
                "index" INTEGER NOT NULL,
                PRIMARY KEY (question_id, "index")
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        // The tag semi-joins look up by (question_id, tag).
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tags_question ON tags(question_id, tag)")
            .execute(&self.pool)
            .await
            .map_err(StorageError::Database)?;

        Ok(())
    }

    /// Load a full question (answers in index order) by id.
    async fn load(&self, id: i64) -> Result<Option<Question>, StorageError> {
        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, text, owner, solution_index
            FROM questions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let answers = sqlx::query(
            r#"
            SELECT "index", text FROM answers
            WHERE question_id = ?1
            ORDER BY "index" ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        let tags: Vec<String> =
            sqlx::query_scalar("SELECT tag FROM tags WHERE question_id = ?1 ORDER BY tag")
                .bind(id)
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::Database)?;

        let mut texts = Vec::with_capacity(answers.len());
        for (expected, answer) in answers.iter().enumerate() {
            let index: i64 = answer.try_get("index").map_err(StorageError::Database)?;
            if index != expected as i64 {
                return Err(StorageError::Corrupt {
                    id: QuestionId::new(id),
                    reason: format!("answer indexes not dense at {expected}"),
                });
            }
            texts.push(answer.try_get::<String, _>("text").map_err(StorageError::Database)?);
        }

        row.into_question(texts, tags.into_iter().collect()).map(Some)
    }
}

#[async_trait]
impl QuestionStore for SqliteStore {
    async fn put(&self, question: &Question) -> Result<(), StorageError> {
        let id = question.validate_storable()?.value();

        let mut tx = self.pool.begin().await.map_err(StorageError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO questions (id, text, owner, solution_index)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                text = excluded.text,
                owner = excluded.owner,
                solution_index = excluded.solution_index
            "#,
        )
        .bind(id)
        .bind(&question.text)
        .bind(question.owner.as_deref())
        .bind(question.solution as i64)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Database)?;

        sqlx::query("DELETE FROM tags WHERE question_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Database)?;

        sqlx::query("DELETE FROM answers WHERE question_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Database)?;

        for tag in &question.tags {
            sqlx::query("INSERT INTO tags (tag, question_id) VALUES (?1, ?2)")
                .bind(tag)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::Database)?;
        }

        for (index, text) in question.answers.iter().enumerate() {
            sqlx::query(r#"INSERT INTO answers (question_id, text, "index") VALUES (?1, ?2, ?3)"#)
                .bind(id)
                .bind(text)
                .bind(index as i64)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::Database)?;
        }

        tx.commit().await.map_err(StorageError::Database)?;
        tracing::debug!(id, "question stored");
        Ok(())
    }

    async fn query_by_tag(
        &self,
        predicate: &CompiledPredicate,
    ) -> Result<Vec<Question>, StorageError> {
        let sql = predicate.select_ids();
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for param in &predicate.params {
            query = query.bind(param.as_str());
        }
        let ids = query
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Database)?;

        let mut questions = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(question) = self.load(id).await? {
                questions.push(question);
            }
        }
        Ok(questions)
    }

    async fn random_question(&self) -> Result<Option<Question>, StorageError> {
        let id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM questions ORDER BY RANDOM() LIMIT 1")
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::Database)?;

        match id {
            Some(id) => self.load(id).await,
            None => Ok(None),
        }
    }

    async fn get(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        self.load(id.value()).await
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Database)?;

        Ok(count as u64)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::Database)?;
        for table in ["tags", "answers", "questions"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(StorageError::Database)?;
        }
        tx.commit().await.map_err(StorageError::Database)?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), StorageError> {
        for table in ["tags", "answers", "questions"] {
            sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
                .execute(&self.pool)
                .await
                .map_err(StorageError::Database)?;
        }
        self.run_migrations().await?;
        tracing::info!("question store schema recreated");
        Ok(())
    }
}

/// Internal row type for SQLite queries.
#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    text: String,
    owner: Option<String>,
    solution_index: i64,
}

impl QuestionRow {
    fn into_question(
        self,
        answers: Vec<String>,
        tags: BTreeSet<String>,
    ) -> Result<Question, StorageError> {
        let id = QuestionId::new(self.id);
        let solution = usize::try_from(self.solution_index).map_err(|_| StorageError::Corrupt {
            id,
            reason: format!("negative solution index {}", self.solution_index),
        })?;

        let question = Question {
            id: Some(id),
            text: self.text,
            answers,
            solution,
            tags,
            owner: self.owner,
        };
        question.validate().map_err(|e| StorageError::Corrupt {
            id,
            reason: e.to_string(),
        })?;
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::QueryCompiler;
    use quiz_types::{TagQuery, ValidationError};

    fn question(id: i64, tags: &[&str]) -> Question {
        Question::new(
            format!("question {id}?"),
            ["first", "second", "third"],
            2,
            tags.iter().copied(),
        )
        .unwrap()
        .with_id(id)
        .with_owner("alice")
    }

    async fn matching(store: &SqliteStore, query: &TagQuery) -> Vec<i64> {
        store
            .query_by_tag(&QueryCompiler::compile(query))
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id.unwrap().value())
            .collect()
    }

    #[tokio::test]
    async fn put_then_query_round_trips() {
        let store = SqliteStore::in_memory().await.unwrap();
        let q = question(1, &["math", "easy"]);
        store.put(&q).await.unwrap();

        let found = store
            .query_by_tag(&QueryCompiler::compile(&TagQuery::all_of(["math", "easy"])))
            .await
            .unwrap();

        assert_eq!(found, vec![q.clone()]);
        assert_eq!(found[0].answers, vec!["first", "second", "third"]);
        assert_eq!(found[0].correct_answer(), Some("third"));
    }

    #[tokio::test]
    async fn answers_keyed_by_question_and_index() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.put(&question(4, &["a"])).await.unwrap();

        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('answers') ORDER BY cid")
                .fetch_all(&store.pool)
                .await
                .unwrap();
        assert_eq!(columns, vec!["question_id", "text", "index"]);

        let indexes: Vec<i64> = sqlx::query_scalar(
            r#"SELECT "index" FROM answers WHERE question_id = 4 ORDER BY "index""#,
        )
        .fetch_all(&store.pool)
        .await
        .unwrap();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn and_requires_every_tag() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.put(&question(1, &["a"])).await.unwrap();
        store.put(&question(2, &["a", "b"])).await.unwrap();

        assert_eq!(matching(&store, &TagQuery::all_of(["a", "b"])).await, vec![2]);
        assert_eq!(matching(&store, &TagQuery::any_of(["a", "b"])).await, vec![1, 2]);
    }

    #[tokio::test]
    async fn not_and_nested_expressions() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.put(&question(1, &["a"])).await.unwrap();
        store.put(&question(2, &["a", "b"])).await.unwrap();
        store.put(&question(3, &["c"])).await.unwrap();

        let not_b = TagQuery::tag("a").and(TagQuery::tag("b").not());
        assert_eq!(matching(&store, &not_b).await, vec![1]);

        let nested = TagQuery::tag("c").or(TagQuery::all_of(["a", "b"]));
        assert_eq!(matching(&store, &nested).await, vec![2, 3]);
    }

    #[tokio::test]
    async fn no_match_is_empty_not_error() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.put(&question(1, &["a"])).await.unwrap();
        assert!(matching(&store, &TagQuery::tag("zzz")).await.is_empty());
        assert!(matching(&store, &TagQuery::Or(vec![])).await.is_empty());
        assert_eq!(matching(&store, &TagQuery::And(vec![])).await, vec![1]);
    }

    #[tokio::test]
    async fn tag_values_are_bound_not_inlined() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.put(&question(1, &["it's"])).await.unwrap();
        assert_eq!(matching(&store, &TagQuery::tag("it's")).await, vec![1]);
        assert!(matching(&store, &TagQuery::tag("x' OR '1'='1"))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn put_replaces_previous_version() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.put(&question(1, &["old", "shared"])).await.unwrap();

        let updated = Question::new("updated?", ["only"], 0, ["new", "shared"])
            .unwrap()
            .with_id(1);
        store.put(&updated).await.unwrap();

        assert!(matching(&store, &TagQuery::tag("old")).await.is_empty());
        assert_eq!(matching(&store, &TagQuery::tag("new")).await, vec![1]);
        assert_eq!(store.get(QuestionId::new(1)).await.unwrap(), Some(updated));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rejects_question_without_id() {
        let store = SqliteStore::in_memory().await.unwrap();
        let local = Question::new("local?", ["a"], 0, ["t"]).unwrap();

        let err = store.put(&local).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Validation(ValidationError::MissingId)
        ));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_invalid_question_before_writing() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut bad = question(1, &["t"]);
        bad.solution = 9;

        assert!(matches!(
            store.put(&bad).await,
            Err(StorageError::Validation(
                ValidationError::SolutionOutOfRange { .. }
            ))
        ));
        assert!(store.get(QuestionId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn random_question_from_store() {
        let store = SqliteStore::in_memory().await.unwrap();
        assert!(store.random_question().await.unwrap().is_none());

        store.put(&question(1, &["a"])).await.unwrap();
        store.put(&question(2, &["b"])).await.unwrap();

        let random = store.random_question().await.unwrap().unwrap();
        assert!(matches!(random.id.unwrap().value(), 1 | 2));
    }

    #[tokio::test]
    async fn clear_deletes_everything() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.put(&question(1, &["a"])).await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        assert!(matching(&store, &TagQuery::tag("a")).await.is_empty());
    }

    #[tokio::test]
    async fn reset_recreates_schema() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.put(&question(1, &["a"])).await.unwrap();
        store.reset().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        store.put(&question(2, &["b"])).await.unwrap();
        assert_eq!(matching(&store, &TagQuery::tag("b")).await, vec![2]);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.db");

        {
            let store = SqliteStore::new(&path).await.unwrap();
            store.put(&question(7, &["geo"])).await.unwrap();
        }

        let store = SqliteStore::new(&path).await.unwrap();
        let q = store.get(QuestionId::new(7)).await.unwrap().unwrap();
        assert_eq!(q.owner.as_deref(), Some("alice"));
        assert!(q.tags.contains("geo"));
    }

    #[tokio::test]
    async fn empty_path_rejected() {
        assert!(matches!(
            SqliteStore::new(Path::new("")).await,
            Err(StorageError::InvalidPath { .. })
        ));
    }
}
