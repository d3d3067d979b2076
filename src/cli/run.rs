//! Run command - one merge pass over every watched repository

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use pr_automerge::error::Result;
use pr_automerge::summary::{render_summary, write_summary};
use pr_automerge::types::RunOutcome;
use tracing::{debug, error};

/// Run the merge pass and report the outcomes
pub async fn run_merge_pass(ctx: &CommandContext, dry_run: bool) -> Result<()> {
    if dry_run {
        println!("{}", "Dry run: pull requests will be evaluated but not merged.".muted());
    }

    let engine = ctx.engine(dry_run)?;
    let outcomes = engine.run().await?;

    print_outcomes(&outcomes);
    report(ctx, &outcomes);
    Ok(())
}

/// Print a colored outcome list
pub fn print_outcomes(outcomes: &[RunOutcome]) {
    if outcomes.is_empty() {
        println!("{}", "No open pull requests found.".muted());
        return;
    }

    println!("{}:", "Merge report".emphasis());
    for outcome in outcomes.iter().filter(|o| o.merged) {
        println!("  {} {}", check().success(), outcome.url.accent());
    }
    for outcome in outcomes.iter().filter(|o| !o.merged) {
        println!("  {} {}", "-".muted(), outcome.url.muted());
    }

    let merged = outcomes.iter().filter(|o| o.merged).count();
    println!();
    println!(
        "{}",
        format!("{merged} of {} pull request(s) merged", outcomes.len()).muted()
    );
}

/// Append the markdown report to the step summary, if one is configured
pub fn report(ctx: &CommandContext, outcomes: &[RunOutcome]) {
    let Some(path) = &ctx.summary_path else {
        return;
    };
    let summary = render_summary(
        &ctx.platform.config().owner,
        outcomes,
        &ctx.settings.repos,
    );
    match write_summary(path, &summary) {
        Ok(()) => debug!(path = %path.display(), "wrote merge report"),
        Err(e) => error!(path = %path.display(), error = %e, "failed to write merge report"),
    }
}
