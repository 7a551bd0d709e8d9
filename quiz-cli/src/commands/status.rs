//! Show cache and queue status.

use anyhow::{Context, Result};

use super::{open, Options};
use crate::config::Settings;

/// Run the status command.
pub async fn run(settings: &Settings, options: &Options) -> Result<()> {
    let (proxy, _events) = open(settings, options).await?;
    let status = proxy
        .status()
        .await
        .context("Failed to read question database")?;

    println!("=== quizsync status ===");
    println!();
    println!("Server:   {}", settings.config.server.base_url);
    println!(
        "Mode:     {}",
        if options.offline { "offline" } else { "online" }
    );
    println!("State:    {}", status.state);
    println!();
    println!("Store:");
    println!("  Path:      {}", settings.config.cache.database.display());
    println!("  Questions: {}", status.stored);
    println!(
        "  Overlay:   {} entries, {} / {} bytes",
        status.overlay.entries, status.overlay.bytes, status.overlay.budget
    );
    println!();
    println!("Queue:");
    println!("  Path:      {}", settings.config.queue.path.display());
    println!("  Pending:   {}", status.queued);
    for pending in proxy.queue().iter() {
        let summary = pending
            .question()
            .map(|q| q.text)
            .unwrap_or_else(|_| "<unreadable>".to_string());
        println!("    {} {}", pending.correlation, summary);
    }

    Ok(())
}
