//! # quiz-store
//!
//! Local question storage for quizsync.
//!
//! Two tiers:
//! - [`SqliteStore`] - durable relational store (questions, answers, tags)
//! - [`OverlayCache`] - byte-bounded LRU in front of any [`QuestionStore`],
//!   writing through to it on every insert
//!
//! ```text
//!        ┌──────────────────────────┐
//!  put ──►      OverlayCache        │ get: hit ─► return
//!        │  ┌────────────────────┐  │      miss ─┐
//!        │  │ ByteLru (50 MiB)   │  │            │
//!        │  └────────────────────┘  │            │
//!        └────────────┬─────────────┘            │
//!                     │ write-through            │
//!        ┌────────────▼─────────────┐            │
//!        │  SqliteStore             ◄────────────┘
//!        │  questions/answers/tags  │
//!        └──────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod overlay;
pub mod storage;

pub use error::{StorageError, StorageResult};
pub use overlay::{OverlayCache, OverlayStats, DEFAULT_OVERLAY_BUDGET};
pub use storage::{QuestionStore, SqliteStore};
