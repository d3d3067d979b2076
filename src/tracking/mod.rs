//! Pull requests tracked between runs
//!
//! The engine never needs this state to decide; it only records the last
//! activity it saw for pull requests that were not yet due and forgets pull
//! requests once they are merged or closed.

mod storage;

pub use storage::{FileStore, default_tracking_path, load_tracking, save_tracking, tracking_path};

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current tracking file format version
pub const TRACKING_VERSION: u32 = 1;

/// A tracked pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPullRequest {
    /// Pull request URL (the key)
    pub url: String,
    /// Last activity observed, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}

impl TrackedPullRequest {
    /// Track a URL with no known activity
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            last_activity: None,
        }
    }

    /// Track a URL with its last activity
    pub fn with_activity(url: impl Into<String>, last_activity: Option<DateTime<Utc>>) -> Self {
        Self {
            url: url.into(),
            last_activity,
        }
    }
}

/// All tracked pull requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingState {
    /// File format version
    pub version: u32,
    /// Tracked pull requests, in insertion order
    #[serde(default)]
    pub pull_requests: Vec<TrackedPullRequest>,
}

impl Default for TrackingState {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingState {
    /// Empty state at the current version
    pub const fn new() -> Self {
        Self {
            version: TRACKING_VERSION,
            pull_requests: Vec::new(),
        }
    }

    /// Find a tracked pull request by URL
    pub fn get(&self, url: &str) -> Option<&TrackedPullRequest> {
        self.pull_requests.iter().find(|p| p.url == url)
    }

    /// Insert or replace a tracked pull request
    pub fn track(&mut self, record: TrackedPullRequest) {
        if let Some(existing) = self.pull_requests.iter_mut().find(|p| p.url == record.url) {
            *existing = record;
        } else {
            self.pull_requests.push(record);
        }
    }

    /// Remove a pull request, returning whether it was tracked
    pub fn untrack(&mut self, url: &str) -> bool {
        let before = self.pull_requests.len();
        self.pull_requests.retain(|p| p.url != url);
        self.pull_requests.len() != before
    }
}

/// Key/value capability for tracked pull requests, keyed by URL
pub trait PullRequestStore: Send + Sync {
    /// Look up a tracked pull request
    fn get(&self, url: &str) -> Result<Option<TrackedPullRequest>>;

    /// Insert or replace a tracked pull request
    fn put(&self, record: TrackedPullRequest) -> Result<()>;

    /// Remove a pull request, returning whether it was tracked
    fn delete(&self, url: &str) -> Result<bool>;

    /// All tracked pull requests
    fn list(&self) -> Result<Vec<TrackedPullRequest>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_replaces_existing() {
        let mut state = TrackingState::new();
        state.track(TrackedPullRequest::new("https://github.com/o/r/pull/1"));
        state.track(TrackedPullRequest::with_activity(
            "https://github.com/o/r/pull/1",
            Some(Utc::now()),
        ));

        assert_eq!(state.pull_requests.len(), 1);
        assert!(state.get("https://github.com/o/r/pull/1").unwrap().last_activity.is_some());
    }

    #[test]
    fn test_untrack() {
        let mut state = TrackingState::new();
        state.track(TrackedPullRequest::new("https://github.com/o/r/pull/1"));

        assert!(state.untrack("https://github.com/o/r/pull/1"));
        assert!(!state.untrack("https://github.com/o/r/pull/1"));
        assert!(state.pull_requests.is_empty());
    }
}
