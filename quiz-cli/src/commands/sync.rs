//! Deliver submissions queued while offline.

use anyhow::{bail, Result};
use quiz_client::Notification;

use super::{open, Options};
use crate::config::Settings;

/// Run the sync command.
pub async fn run(settings: &Settings, options: &Options) -> Result<()> {
    if options.offline {
        bail!("Cannot sync in offline mode");
    }

    let (mut proxy, mut events) = open(settings, options).await?;
    if proxy.queue().is_empty() {
        println!("Nothing to sync");
        return Ok(());
    }

    let report = proxy.connectivity_regained().await;

    while let Ok(event) = events.try_recv() {
        match event {
            Notification::SubmissionAccepted {
                correlation,
                question,
                ..
            } => match question.id {
                Some(id) => println!("  delivered {correlation} as #{id}"),
                None => println!("  delivered {correlation}"),
            },
            Notification::SubmissionRejected { correlation, kind } => {
                println!("  dropped {correlation}: {kind}");
            }
            Notification::ConnectivityLost => println!("  question bank unreachable"),
            _ => {}
        }
    }

    println!(
        "Delivered: {}  Rejected: {}  Remaining: {}",
        report.delivered, report.rejected, report.remaining
    );
    if report.halted {
        bail!("Sync stopped with {} submission(s) still queued", report.remaining);
    }
    Ok(())
}
