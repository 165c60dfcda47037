//! # iptcheck CLI
//!
//! `iptcheck` compares the dataset listings of configured IPT feed sources
//! with the Grist reference catalog and reports listed datasets the
//! catalog is missing.
//!
//! ## Usage
//!
//! ```bash
//! iptcheck --config ./config/iptcheck.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `iptcheck sources` | List configured feed sources |
//! | `iptcheck feed <source-id>` | Fetch and print one source's feed items |
//! | `iptcheck check` | Run the full reconciliation and write reports |
//!
//! Credentials come from the environment: `GRIST_API_KEY` (always) and
//! `GRIST_DOC_ID` (when `catalog.doc_id` is not configured).

mod catalog;
mod check;
mod config;
mod feed;
mod index;
mod kingdom;
mod matching;
mod models;
mod normalize;
mod report;
mod sources;
mod tag;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reconcile IPT dataset feeds against a Grist reference catalog.
#[derive(Parser)]
#[command(
    name = "iptcheck",
    about = "Reconciles IPT dataset feeds against a Grist reference catalog",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/iptcheck.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List configured feed sources.
    Sources,

    /// Fetch one source's feed and print its items with derived fields.
    ///
    /// Touches only the feed, never the catalog. Useful for verifying a
    /// source entry before a full check.
    Feed {
        /// Source id as configured in `[[sources]]`.
        source: String,
    },

    /// Run the full reconciliation.
    ///
    /// Fetches every configured feed, fetches the catalog, matches each
    /// feed resource through the tiered strategies, prints a summary, and
    /// writes CSV/TSV reports of the missing resources.
    Check {
        /// Restrict the run to one configured source.
        #[arg(long)]
        source: Option<String>,

        /// Maximum number of feed resources to process.
        #[arg(long)]
        limit: Option<usize>,

        /// Print the summary without writing report files.
        #[arg(long)]
        dry_run: bool,

        /// Directory for the report files (defaults to `[report].output_dir`).
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Feed { source } => {
            feed::run_feed(&cfg, &source).await?;
        }
        Commands::Check {
            source,
            limit,
            dry_run,
            output_dir,
        } => {
            check::run_check(
                &cfg,
                check::CheckOptions {
                    source,
                    limit,
                    dry_run,
                    output_dir,
                },
            )
            .await?;
        }
    }

    Ok(())
}
