//! # quiz-client
//!
//! Offline-capable client for a quiz question bank.
//!
//! This is the main library that applications use to fetch, search and
//! submit questions with or without network connectivity.
//!
//! ## Features
//!
//! - **Search protocol**: paginated server search, with a local tag query as fallback
//! - **Two-tier cache**: byte-bounded overlay written through to SQLite
//! - **Deferred submissions**: durable FIFO replayed on reconnect
//! - **Pure State Machine**: uses quiz-core for side-effect-free logic
//!
//! ## Example
//!
//! ```ignore
//! use quiz_client::{HttpServer, ManualConnectivity, PendingQueue, SyncProxy};
//! use quiz_store::{OverlayCache, SqliteStore};
//!
//! let store = SqliteStore::new(Path::new("quizsync.db")).await?;
//! let cache = Arc::new(OverlayCache::new(store, DEFAULT_OVERLAY_BUDGET));
//! let server = HttpServer::new("https://sweng-quiz.appspot.com", Duration::from_secs(10))?;
//! let (mut proxy, events) = SyncProxy::new(
//!     server,
//!     ManualConnectivity::new(true),
//!     cache,
//!     PendingQueue::load("pending.queue"),
//! );
//!
//! let outcome = proxy.get_question().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod connectivity;
pub mod events;
pub mod proxy;
pub mod queue;
pub mod server;

pub use config::{CacheConfig, Config, ConfigError, QueueConfig, ServerConfig};
pub use connectivity::{Connectivity, ManualConnectivity};
pub use events::{FailureKind, Notification};
pub use proxy::{DrainReport, ProxyStatus, SyncProxy, RANDOM_PATH, SEARCH_PATH, SUBMIT_PATH};
pub use queue::{PendingQueue, QueueError};
pub use quiz_core::ProxyState;
pub use server::{HttpServer, MockServer, QuizServer, SessionCredential, TransportError};
