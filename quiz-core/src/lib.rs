//! # quiz-core
//!
//! Pure logic for quizsync (no I/O, instant tests).
//!
//! This crate holds the decision-making parts of the sync layer without
//! any network or disk access:
//! - [`SearchMachine`] - the NORMAL / SEARCHING / PAGINATING search protocol
//! - [`QueryCompiler`] - tag-search AST to parameterized SQL predicate
//! - [`ByteLru`] - byte-budgeted least-recently-used index
//! - [`ResponseClass`] - status code classification
//!
//! The actual I/O (HTTP, SQLite, the queue file) is performed by
//! `quiz-store` and `quiz-client`, which interpret the actions produced
//! here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod compiler;
pub mod lru;
pub mod state;

pub use classify::ResponseClass;
pub use compiler::{CompiledPredicate, QueryCompiler};
pub use lru::ByteLru;
pub use state::{ProxyState, SearchAction, SearchEvent, SearchMachine, SearchSession};
