//! Open pull request discovery

use crate::config::ReposSettings;
use crate::error::Result;
use crate::merge::targets::resolve_filters;
use crate::platform::PlatformService;
use crate::types::PullRequestSummary;
use std::collections::HashSet;
use tracing::info;

/// Find every open, non-draft pull request in the watched targets.
///
/// Errors are returned as-is: an empty list must only ever mean that there
/// is nothing to merge, never that the search failed.
pub async fn discover_pull_requests(
    platform: &dyn PlatformService,
    repos: &ReposSettings,
) -> Result<Vec<PullRequestSummary>> {
    let filters = resolve_filters(repos, &platform.config().owner);
    let mut pull_requests = platform.search_open_pull_requests(&filters).await?;

    // Search pages can shift while paginating; keep the first copy of each URL
    let mut seen = HashSet::new();
    pull_requests.retain(|pr| seen.insert(pr.html_url.clone()));

    info!(count = pull_requests.len(), "discovered open pull requests");
    Ok(pull_requests)
}
