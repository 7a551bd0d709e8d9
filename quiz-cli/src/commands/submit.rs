//! Submit a question from a JSON file.

use anyhow::{bail, Context, Result};
use quiz_client::Notification;
use quiz_types::Question;
use std::path::Path;

use super::{format_question, open, Options};
use crate::config::Settings;

/// Read a question from `path`.
pub async fn read_question(path: &Path) -> Result<Question> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Question::from_json(&contents).with_context(|| format!("Invalid question in {}", path.display()))
}

/// Run the submit command.
pub async fn run(settings: &Settings, options: &Options, path: &Path) -> Result<()> {
    let question = read_question(path).await?;
    let (mut proxy, _events) = open(settings, options).await?;

    match proxy.submit(question).await {
        Notification::SubmissionAccepted {
            correlation,
            question,
            deferred,
        } => {
            if deferred {
                println!("Queued for delivery ({correlation})");
                println!("Pending submissions: {}", proxy.queue().len());
            } else {
                println!("Submitted ({correlation})");
            }
            print!("{}", format_question(&question));
            Ok(())
        }
        Notification::SubmissionRejected { correlation, kind } => {
            bail!("Submission {correlation} rejected: {kind}")
        }
        other => bail!("Unexpected outcome: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reads_question_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("q.json");
        std::fs::write(
            &path,
            r#"{"question": "2 + 2?", "answers": ["3", "4"], "solution": 1, "tags": ["math"]}"#,
        )
        .unwrap();

        let question = read_question(&path).await.unwrap();
        assert_eq!(question.text, "2 + 2?");
        assert!(question.id.is_none());
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("q.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(read_question(&path).await.is_err());
        assert!(read_question(&dir.path().join("missing.json")).await.is_err());
    }
}
