//! Discard queued submissions and optionally the local store.

use anyhow::{Context, Result};
use quiz_store::QuestionStore;

use super::{open, Options};
use crate::config::Settings;

/// Run the reset command.
pub async fn run(settings: &Settings, options: &Options, store: bool) -> Result<()> {
    let (mut proxy, _events) = open(settings, options).await?;
    let dropped = proxy.queue().len();

    proxy.reset().context("Failed to clear pending queue")?;
    println!("Discarded {dropped} pending submission(s)");

    if store {
        proxy
            .cache()
            .store()
            .reset()
            .await
            .context("Failed to reset question database")?;
        proxy.cache().clear();
        println!("Question database reset");
    }
    Ok(())
}
