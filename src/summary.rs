//! Markdown merge report for the workflow run summary

use crate::config::ReposSettings;
use crate::error::Result;
use crate::types::RunOutcome;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

/// Render the merge report.
///
/// Merged pull requests are listed first; `owner` is used to link the
/// watched and ignored targets.
pub fn render_summary(owner: &str, outcomes: &[RunOutcome], repos: &ReposSettings) -> String {
    let target = format!("https://github.com/{owner}");
    let mut sorted: Vec<&RunOutcome> = outcomes.iter().collect();
    sorted.sort_by_key(|o| !o.merged);

    let mut out = String::new();
    out.push_str("## Merge report\n\n");
    out.push_str("<samp>\n\n");
    out.push_str("| Merged | ID |\n");
    out.push_str("|---|---|\n");
    for outcome in sorted {
        let status = if outcome.merged { "🔵" } else { "⚫️" };
        let id = outcome.url.rsplit('/').next().unwrap_or(&outcome.url);
        out.push_str(&format!("| {status} | [{id}]({}) |\n", outcome.url));
    }
    out.push_str("\n</samp>\n\n");
    out.push_str("🔵= merged\n");
    out.push_str("⚫️= unmerged\n\n");

    out.push_str("## Configuration\n\n");
    out.push_str("### Watching Repositories\n\n");
    for repo in &repos.monitor {
        out.push_str(&format!("- [{repo}]({target}/{})\n", repo_path(repo, owner)));
    }
    out.push_str("\n### Ignored Repositories\n\n");
    for repo in &repos.ignore {
        out.push_str(&format!("- [{repo}]({target}/{})\n", repo_path(repo, owner)));
    }
    out
}

/// Link path below the owner for an `org` or `org/repo` target
fn repo_path<'a>(target: &'a str, owner: &str) -> &'a str {
    let target = target.trim_start_matches('-');
    target
        .split_once('/')
        .filter(|(org, _)| org.eq_ignore_ascii_case(owner))
        .map_or("", |(_, repo)| repo)
}

/// Append the report to a summary file (e.g. `$GITHUB_STEP_SUMMARY`)
pub fn write_summary(path: &Path, summary: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(summary.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}
