//! Watch targets to search filter clauses
//!
//! Only targets owned by the acting repository's owner are honored; anything
//! else is dropped without error.

use crate::config::ReposSettings;
use tracing::{debug, warn};

/// A parsed `org` or `org/repo` target, optionally negated with a leading `-`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    /// Exclude instead of include
    pub negated: bool,
    /// Organization (or user) name
    pub org: String,
    /// Repository name, when the target names a single repository
    pub repo: Option<String>,
}

impl WatchTarget {
    /// Parse a target string. Returns `None` for malformed targets.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let (negated, rest) = trimmed
            .strip_prefix('-')
            .map_or((false, trimmed), |r| (true, r));

        let mut parts = rest.split('/');
        let org = parts.next().filter(|s| !s.is_empty())?;
        let repo = match parts.next() {
            Some("") => return None,
            Some(repo) => Some(repo.to_string()),
            None => None,
        };
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            negated,
            org: org.to_string(),
            repo,
        })
    }

    /// Search qualifier for this target (`repo:o/r` or `org:o`), negated when asked
    pub fn to_filter(&self, negated: bool) -> String {
        let sign = if negated { "-" } else { "" };
        match &self.repo {
            Some(repo) => format!("{sign}repo:{}/{repo}", self.org),
            None => format!("{sign}org:{}", self.org),
        }
    }

    fn is_owned_by(&self, owner: &str) -> bool {
        self.org.eq_ignore_ascii_case(owner)
    }
}

fn resolve_owned(raw: &str, owner: &str) -> Option<WatchTarget> {
    let Some(target) = WatchTarget::parse(raw) else {
        warn!(target = raw, "ignoring malformed watch target");
        return None;
    };
    if !target.is_owned_by(owner) {
        debug!(target = raw, owner, "dropping target outside the acting owner");
        return None;
    }
    Some(target)
}

/// Resolve monitor/ignore lists into ordered search filter clauses.
///
/// Monitor targets keep their own sign, ignore targets are always negated.
/// When monitor yields no positive clause, the search is scoped to
/// `org:{owner}` so it never runs unbounded.
pub fn resolve_filters(repos: &ReposSettings, owner: &str) -> Vec<String> {
    let mut filters: Vec<String> = repos
        .monitor
        .iter()
        .filter_map(|raw| resolve_owned(raw, owner))
        .map(|t| t.to_filter(t.negated))
        .collect();

    if !filters.iter().any(|f| !f.starts_with('-')) {
        filters.insert(0, format!("org:{owner}"));
    }

    filters.extend(
        repos
            .ignore
            .iter()
            .filter_map(|raw| resolve_owned(raw, owner))
            .map(|t| t.to_filter(true)),
    );

    debug!(?filters, "resolved search filters");
    filters
}
