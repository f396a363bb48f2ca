//! # FAQ Harness CLI (`faq`)
//!
//! ## Usage
//!
//! ```bash
//! faq [--config ./faq.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `faq serve` | Start the HTTP chat server |
//! | `faq ask "<message>"` | Answer one message and exit |
//! | `faq search "<query>"` | Show ranked knowledge records with scores |
//! | `faq check` | Parse the knowledge file and list its records |
//!
//! Without `--config`, built-in defaults are used (knowledge file
//! `chatbot-data.txt` in the working directory, port 5000).

use clap::{Parser, Subcommand};
use faq_harness::{ask, check, config, search, server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// FAQ Harness — keyword FAQ retrieval with optional LLM answers.
#[derive(Parser)]
#[command(
    name = "faq",
    about = "FAQ Harness — keyword FAQ retrieval with optional LLM answers",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat server.
    ///
    /// Binds to `[server].host` and `[server].port` (or `PORT`).
    Serve,

    /// Answer a single message using the same pipeline as the server.
    Ask {
        /// The message to answer.
        message: String,
    },

    /// Show how knowledge records rank for a query.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results (defaults to `[knowledge].top_k`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Parse the knowledge file and report its records.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("faq_harness=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => server::run_server(&cfg).await?,
        Commands::Ask { message } => ask::run_ask(&cfg, &message).await?,
        Commands::Search { query, limit } => search::run_search(&cfg, &query, limit)?,
        Commands::Check => check::run_check(&cfg)?,
    }

    Ok(())
}
