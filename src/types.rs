//! Core types for pr-automerge

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A pull request identified by its repository and number
///
/// Parsed from the canonical web locator, e.g.
/// `https://github.com/ubiquibot/automated-merging/pull/1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub number: u64,
}

impl PullRequestRef {
    /// Parse a pull request locator URL.
    ///
    /// The path must be exactly `/{owner}/{repo}/pull/{number}`.
    pub fn parse(locator: &str) -> Result<Self> {
        let invalid = || Error::InvalidUrl(locator.to_string());

        let url = Url::parse(locator).map_err(|_| invalid())?;
        let segments: Vec<&str> = url.path().split('/').skip(1).collect();

        let [owner, repo, "pull", number] = segments.as_slice() else {
            return Err(invalid());
        };
        if owner.is_empty() || repo.is_empty() {
            return Err(invalid());
        }
        let number = number.parse::<u64>().map_err(|_| invalid())?;

        Ok(Self {
            owner: (*owner).to_string(),
            repo: (*repo).to_string(),
            number,
        })
    }
}

impl FromStr for PullRequestRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// A pull request returned by discovery search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    /// Web URL of the pull request
    pub html_url: String,
    /// Pull request number
    pub number: u64,
    /// Title, when the search result carries one
    #[serde(default)]
    pub title: Option<String>,
}

/// The fields of a pull request the engine decides on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDetails {
    /// Whether the pull request has been merged
    pub merged: bool,
    /// Whether the pull request has been closed
    pub closed: bool,
    /// SHA of the head commit
    pub head_sha: String,
    /// Author's association with the repository (e.g. `COLLABORATOR`)
    pub author_association: String,
}

/// One entry from an issue timeline
///
/// Only the timestamp-bearing fields are kept; GitHub sets different ones
/// depending on the event type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Event type (e.g. `commented`, `committed`), informational only
    #[serde(default)]
    pub event: Option<String>,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update time
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Generic timestamp field (cross-reference events)
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Comment time
    #[serde(default)]
    pub commented_at: Option<String>,
}

/// A pull request review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review state (`APPROVED`, `CHANGES_REQUESTED`, `COMMENTED`, ...)
    pub state: String,
    /// Reviewer's association with the repository
    pub author_association: String,
}

/// A single CI check run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    /// Check run name (job name for GitHub Actions)
    pub name: String,
    /// `queued`, `in_progress` or `completed`
    pub status: String,
    /// Set once `status == "completed"`
    #[serde(default)]
    pub conclusion: Option<String>,
}

/// Aggregated CI result for a head commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiStatus {
    /// At least one run has not reached a terminal state
    Pending,
    /// Every terminal run passed
    Green,
    /// At least one terminal run failed
    Red,
}

impl fmt::Display for CiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Green => write!(f, "green"),
            Self::Red => write!(f, "red"),
        }
    }
}

/// Result of a merge operation
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Outcome recorded for every processed pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Pull request URL
    pub url: String,
    /// Whether this run merged it
    pub merged: bool,
}

/// Eligibility class of a pull request author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Author association is allow-listed
    Collaborator,
    /// Everyone else
    Contributor,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collaborator => write!(f, "collaborator"),
            Self::Contributor => write!(f, "contributor"),
        }
    }
}

/// The repository the engine runs on behalf of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom API base URL (None for api.github.com)
    pub api_url: Option<String>,
}

impl PlatformConfig {
    /// Parse an `owner/repo` slug such as the `GITHUB_REPOSITORY` value
    pub fn from_slug(slug: &str, api_url: Option<String>) -> Result<Self> {
        match slug.split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    api_url,
                })
            }
            _ => Err(Error::Config(format!(
                "repository: expected `owner/repo`, got {slug:?}"
            ))),
        }
    }
}
