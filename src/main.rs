//! dependabot-helper CLI

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dependabot_helper::types::MergeMethod;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`)
const LOG_ENV: &str = "DEPENDABOT_HELPER_LOG";

/// Triage and bulk-merge Dependabot pull requests
#[derive(Parser, Debug)]
#[command(name = "dependabot-helper")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the options file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by DEPENDABOT_HELPER_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List repositories of a user or organization
    Repos {
        /// User or organization login
        owner: String,
    },

    /// Show bot pull requests of a repository with their verdicts
    Prs {
        /// Repository as owner/name or URL
        repo: String,
    },

    /// Approve a pull request
    Approve {
        /// Repository as owner/name or URL
        repo: String,
        /// Pull request number
        number: u64,
    },

    /// Merge every eligible bot pull request of a repository
    Merge {
        /// Repository as owner/name or URL
        repo: String,
        /// Preferred merge method (merge, rebase, squash)
        #[arg(short, long)]
        method: Option<MergeMethod>,
        /// Preview the pull requests and prompt before merging
        #[arg(long)]
        confirm: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let ctx = cli::CommandContext::new(cli.config.as_deref(), cancel).await?;

    match cli.command {
        Commands::Repos { owner } => cli::run_repos(&ctx, &owner).await?,
        Commands::Prs { repo } => cli::run_prs(&ctx, &repo).await?,
        Commands::Approve { repo, number } => cli::run_approve(&ctx, &repo, number).await?,
        Commands::Merge {
            repo,
            method,
            confirm,
        } => {
            cli::run_merge(&ctx, &repo, cli::MergeOptions { method, confirm }).await?;
        }
    }

    Ok(())
}
