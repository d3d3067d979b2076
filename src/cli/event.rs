//! Event command - react to a repository event

use crate::cli::context::CommandContext;
use crate::cli::run::{print_outcomes, report};
use crate::cli::style::Stylize;
use anstream::println;
use pr_automerge::error::{Error, Result};
use pr_automerge::events::{EventOutcome, EventPayload, GitHubEvent, handle_event};
use std::path::Path;

/// Dispatch `name` with the payload read from `payload`
pub async fn run_event(ctx: &CommandContext, name: &str, payload: Option<&Path>) -> Result<()> {
    let payload = match payload {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Event(format!("failed to read {}: {e}", path.display()))
            })?;
            EventPayload::from_json(&content)?
        }
        None => EventPayload::default(),
    };
    let event = GitHubEvent::from_parts(name, payload.action.as_deref());

    let engine = ctx.engine(false)?;
    match handle_event(&event, &payload, &engine, ctx.store()).await? {
        EventOutcome::Tracked(url) => {
            println!("{} {}", "Tracking".success(), url.accent());
        }
        EventOutcome::Untracked { url, was_tracked } => {
            if was_tracked {
                println!("{} {}", "Untracked".success(), url.accent());
            } else {
                println!("{}", format!("{url} was not tracked").muted());
            }
        }
        EventOutcome::MergePass(outcomes) => {
            print_outcomes(&outcomes);
            report(ctx, &outcomes);
        }
        EventOutcome::Skipped { reason } => {
            println!("{} {}", format!("Skipped {event}:").warn(), reason.muted());
        }
    }
    Ok(())
}
