//! CLI command implementations.

pub mod random;
pub mod reset;
pub mod search;
pub mod status;
pub mod submit;
pub mod sync;

use anyhow::{Context, Result};
use quiz_client::{
    HttpServer, ManualConnectivity, Notification, PendingQueue, SessionCredential, SyncProxy,
};
use quiz_store::{OverlayCache, SqliteStore};
use quiz_types::Question;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::Settings;

/// The proxy as wired by the CLI.
pub type Proxy = SyncProxy<HttpServer, ManualConnectivity, SqliteStore>;

/// Flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Start in offline mode.
    pub offline: bool,
    /// Session id for the Authorization header.
    pub session: Option<String>,
}

/// Open the store and queue and build a proxy over them.
pub async fn open(
    settings: &Settings,
    options: &Options,
) -> Result<(Proxy, UnboundedReceiver<Notification>)> {
    let config = &settings.config;

    let store = SqliteStore::new(&config.cache.database)
        .await
        .with_context(|| {
            format!(
                "Failed to open question database {}",
                config.cache.database.display()
            )
        })?;
    let cache = Arc::new(OverlayCache::new(store, config.cache.overlay_budget_bytes));
    let queue = PendingQueue::load(&config.queue.path);
    let server = HttpServer::new(&config.server.base_url, config.server.timeout())
        .context("Failed to build HTTP client")?;

    let (mut proxy, events) =
        SyncProxy::new(server, ManualConnectivity::new(!options.offline), cache, queue);
    if let Some(session) = &options.session {
        proxy = proxy.with_credential(SessionCredential::new(
            config.server.auth_scheme.clone(),
            session.clone(),
        ));
    }
    Ok((proxy, events))
}

/// Render a question for the terminal, marking the correct answer.
pub fn format_question(question: &Question) -> String {
    let mut out = match question.id {
        Some(id) => format!("[#{id}] {}\n", question.text),
        None => format!("[local] {}\n", question.text),
    };
    for (i, answer) in question.answers.iter().enumerate() {
        let mark = if i == question.solution { " *" } else { "" };
        out.push_str(&format!("  {}) {answer}{mark}\n", i + 1));
    }
    if !question.tags.is_empty() {
        let tags: Vec<&str> = question.tags.iter().map(String::as_str).collect();
        out.push_str(&format!("  tags: {}\n", tags.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_marks_solution() {
        let q = Question::new("2 + 2?", ["3", "4"], 1, ["math"])
            .unwrap()
            .with_id(5);
        let text = format_question(&q);

        assert!(text.starts_with("[#5] 2 + 2?"));
        assert!(text.contains("  2) 4 *"));
        assert!(!text.contains("1) 3 *"));
        assert!(text.contains("tags: math"));
    }

    #[test]
    fn format_local_question() {
        let q = Question::new("draft?", ["a"], 0, Vec::<String>::new()).unwrap();
        let text = format_question(&q);

        assert!(text.starts_with("[local] draft?"));
        assert!(!text.contains("tags:"));
    }

    #[test]
    fn format_lists_every_answer_on_its_own_line() {
        let q = Question::new("pick", ["x", "y", "z"], 2, ["a", "b"])
            .unwrap()
            .with_id(3);

        assert_eq!(
            format_question(&q),
            "[#3] pick\n  1) x\n  2) y\n  3) z *\n  tags: a, b\n"
        );
    }
}
