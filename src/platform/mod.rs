//! Hosting platform services
//!
//! The engine only talks to the hosting platform through [`PlatformService`],
//! so tests can drive it with an in-memory implementation.

mod github;

pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    CheckRun, MergeResult, PlatformConfig, PullRequestDetails, PullRequestRef,
    PullRequestSummary, Review, TimelineEvent,
};
use async_trait::async_trait;

/// Platform service trait for the operations the merge engine needs
///
/// Every listing method must return the complete result set, following
/// pagination to the end. All methods are safe to retry except
/// [`merge_pull_request`], which the engine calls at most once per pull
/// request per run.
///
/// [`merge_pull_request`]: Self::merge_pull_request
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Search open, non-draft pull requests matching all filter clauses
    async fn search_open_pull_requests(&self, filters: &[String])
    -> Result<Vec<PullRequestSummary>>;

    /// Get merge state, head SHA and author association
    async fn get_pull_request(&self, pr: &PullRequestRef) -> Result<PullRequestDetails>;

    /// List every timeline event of the pull request's issue
    async fn list_timeline_events(&self, pr: &PullRequestRef) -> Result<Vec<TimelineEvent>>;

    /// List every review of the pull request
    async fn list_reviews(&self, pr: &PullRequestRef) -> Result<Vec<Review>>;

    /// List the check suite IDs for a commit
    async fn list_check_suites(&self, pr: &PullRequestRef, sha: &str) -> Result<Vec<u64>>;

    /// List the check runs of one check suite
    async fn list_check_runs_for_suite(
        &self,
        pr: &PullRequestRef,
        suite_id: u64,
    ) -> Result<Vec<CheckRun>>;

    /// Merge the pull request
    async fn merge_pull_request(&self, pr: &PullRequestRef) -> Result<MergeResult>;

    /// Get the acting repository configuration
    fn config(&self) -> &PlatformConfig;
}
