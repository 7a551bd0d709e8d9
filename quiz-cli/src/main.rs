//! # quizsync
//!
//! Command-line front end for the quizsync question cache.
//!
//! ## Commands
//!
//! - `random`: Show a random question
//! - `search`: Page through questions matching tags
//! - `submit`: Submit a question from a JSON file
//! - `sync`: Deliver submissions queued while offline
//! - `status`: Show cache and queue status
//! - `reset`: Discard queued submissions (and optionally the local store)
//!
//! ## Example
//!
//! ```bash
//! # Fetch a question, falling back to the cache when unreachable
//! quizsync random
//!
//! # Questions tagged both math and easy, from the cache only
//! quizsync --offline search --tag math --tag easy
//!
//! # Submit while offline, deliver later
//! quizsync --offline submit question.json
//! quizsync --session abc123 sync
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{random, reset, search, status, submit, sync};

/// Offline-capable quiz question client.
#[derive(Parser, Debug)]
#[command(name = "quizsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/quizsync.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the question database and pending queue
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Never contact the question bank
    #[arg(long, global = true)]
    offline: bool,

    /// Session id sent in the Authorization header
    #[arg(long, global = true)]
    session: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show a random question
    Random,

    /// Page through questions matching tags
    Search {
        /// Tag to match (repeatable)
        #[arg(long, short, required = true)]
        tag: Vec<String>,

        /// Match any tag instead of all of them
        #[arg(long)]
        any: bool,

        /// Maximum number of questions to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Submit a question from a JSON file
    Submit {
        /// Question file
        file: PathBuf,
    },

    /// Deliver submissions queued while offline
    Sync,

    /// Show cache and queue status
    Status,

    /// Discard queued submissions
    Reset {
        /// Also drop and recreate the local question database
        #[arg(long)]
        store: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Library targets are quizsync_*, so one prefix covers the workspace.
    let default_filter = if cli.verbose {
        "quizsync=debug"
    } else {
        "quizsync=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = config::Settings::resolve(cli.config.as_deref(), cli.data_dir)?;
    let options = commands::Options {
        offline: cli.offline,
        session: cli.session,
    };

    match cli.command {
        Commands::Random => {
            random::run(&settings, &options).await?;
        }
        Commands::Search { tag, any, limit } => {
            search::run(&settings, &options, &tag, any, limit).await?;
        }
        Commands::Submit { file } => {
            submit::run(&settings, &options, &file).await?;
        }
        Commands::Sync => {
            sync::run(&settings, &options).await?;
        }
        Commands::Status => {
            status::run(&settings, &options).await?;
        }
        Commands::Reset { store } => {
            reset::run(&settings, &options, store).await?;
        }
    }

    Ok(())
}
