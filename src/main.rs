//! automerge - merge pull requests once review, timeout and CI rules pass

mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cli::{CommandContext, ContextArgs, run_event, run_merge_pass};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "automerge")]
#[command(about = "Merge pull requests once they satisfy review, timeout and CI rules")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    context: ContextArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one merge pass over every watched repository
    Run {
        /// Evaluate every pull request without merging
        #[arg(long)]
        dry_run: bool,
    },

    /// Handle a repository event (e.g. `pull_request.opened`, `schedule`)
    Event {
        /// Event name; `pull_request` is qualified by the payload action
        #[arg(env = "GITHUB_EVENT_NAME")]
        name: String,

        /// Path to the JSON event payload
        #[arg(long, env = "GITHUB_EVENT_PATH")]
        payload: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "automerge=debug,pr_automerge=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = CommandContext::new(&cli.context)
        .await
        .context("failed to initialize")?;

    match cli.command {
        Commands::Run { dry_run } => {
            run_merge_pass(&ctx, dry_run)
                .await
                .context("merge pass failed")?;
        }
        Commands::Event { name, payload } => {
            run_event(&ctx, &name, payload.as_deref())
                .await
                .with_context(|| format!("failed to handle event {name}"))?;
        }
    }

    Ok(())
}
