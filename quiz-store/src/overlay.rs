//! In-memory overlay in front of a [`QuestionStore`].
//!
//! Every insert is written through to the backing store before the overlay
//! is touched, so the overlay never holds a question the store lacks.
//! Lookups that miss the overlay read the store but do not repopulate the
//! overlay.

use std::sync::{Mutex, PoisonError};

use quiz_core::{ByteLru, CompiledPredicate};
use quiz_types::{Question, QuestionId};

use crate::error::StorageError;
use crate::storage::QuestionStore;

/// Default overlay budget: 50 MiB of serialized questions.
pub const DEFAULT_OVERLAY_BUDGET: usize = 50 * 1024 * 1024;

/// Snapshot of overlay occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStats {
    /// Number of questions held in memory.
    pub entries: usize,
    /// Total serialized size of those questions.
    pub bytes: usize,
    /// Configured byte budget.
    pub budget: usize,
}

/// Byte-bounded LRU overlay with write-through to `S`.
///
/// Methods take `&self`; the overlay can be shared behind an `Arc`.
pub struct OverlayCache<S> {
    store: S,
    lru: Mutex<ByteLru<QuestionId, Question>>,
}

impl<S: QuestionStore> OverlayCache<S> {
    /// Wrap `store` with an overlay of `budget` bytes.
    pub fn new(store: S, budget: usize) -> Self {
        Self {
            store,
            lru: Mutex::new(ByteLru::new(budget)),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist a question, then hold it in the overlay.
    pub async fn put(&self, question: &Question) -> Result<(), StorageError> {
        let id = question.validate_storable()?;
        self.store.put(question).await?;

        let cost = question.byte_cost();
        let evicted = self.lock().insert(id, question.clone(), cost);
        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), "overlay evicted questions");
        }
        Ok(())
    }

    /// Look a question up, overlay first.
    pub async fn get(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let cached = self.lock().get(&id).cloned();
        if let Some(question) = cached {
            tracing::debug!(%id, "overlay hit");
            return Ok(Some(question));
        }

        tracing::debug!(%id, "overlay miss");
        self.store.get(id).await
    }

    /// Delegate a tag query to the store.
    pub async fn query_by_tag(
        &self,
        predicate: &CompiledPredicate,
    ) -> Result<Vec<Question>, StorageError> {
        self.store.query_by_tag(predicate).await
    }

    /// Delegate a random lookup to the store.
    pub async fn random_question(&self) -> Result<Option<Question>, StorageError> {
        self.store.random_question().await
    }

    /// Drop the in-memory overlay only.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Current occupancy.
    pub fn stats(&self) -> OverlayStats {
        let lru = self.lock();
        OverlayStats {
            entries: lru.len(),
            bytes: lru.total_bytes(),
            budget: lru.budget(),
        }
    }

    /// True if `id` is currently held in memory.
    pub fn contains(&self, id: QuestionId) -> bool {
        self.lock().peek(&id).is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ByteLru<QuestionId, Question>> {
        self.lru.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
