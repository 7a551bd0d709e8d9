//! Show a random question.

use anyhow::Result;
use quiz_client::Notification;

use super::{format_question, open, Options};
use crate::config::Settings;

/// Run the random command.
pub async fn run(settings: &Settings, options: &Options) -> Result<()> {
    let (mut proxy, _events) = open(settings, options).await?;

    match proxy.get_question().await {
        Notification::QuestionReady(question) => print!("{}", format_question(&question)),
        Notification::NothingAvailable(kind) => println!("No question available: {kind}"),
        other => tracing::debug!(?other, "unexpected outcome"),
    }
    Ok(())
}
