//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use pr_automerge::error::{Error, Result};
use pr_automerge::platform::PlatformService;
use pr_automerge::types::{
    CheckRun, MergeResult, PlatformConfig, PullRequestDetails, PullRequestRef,
    PullRequestSummary, Review, TimelineEvent,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// In-memory `PlatformService`
///
/// Features:
/// - Configurable responses per pull request number
/// - Scripted check-run rounds per suite (the last round repeats)
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    search_results: Mutex<Vec<PullRequestSummary>>,
    details: Mutex<HashMap<u64, PullRequestDetails>>,
    timelines: Mutex<HashMap<u64, Vec<TimelineEvent>>>,
    reviews: Mutex<HashMap<u64, Vec<Review>>>,
    check_suites: Mutex<HashMap<String, Vec<u64>>>,
    check_run_rounds: Mutex<HashMap<u64, VecDeque<Vec<CheckRun>>>>,
    merge_responses: Mutex<HashMap<u64, MergeResult>>,
    // Call tracking
    search_calls: Mutex<Vec<Vec<String>>>,
    details_calls: Mutex<Vec<u64>>,
    reviews_calls: Mutex<Vec<u64>>,
    check_suites_calls: Mutex<Vec<String>>,
    merge_calls: Mutex<Vec<u64>>,
    // Error injection
    error_on_search: Mutex<Option<String>>,
    error_on_details: Mutex<HashMap<u64, String>>,
    error_on_timeline: Mutex<Option<String>>,
    error_on_reviews: Mutex<Option<String>>,
    error_on_check_suites: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            search_results: Mutex::new(Vec::new()),
            details: Mutex::new(HashMap::new()),
            timelines: Mutex::new(HashMap::new()),
            reviews: Mutex::new(HashMap::new()),
            check_suites: Mutex::new(HashMap::new()),
            check_run_rounds: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(HashMap::new()),
            search_calls: Mutex::new(Vec::new()),
            details_calls: Mutex::new(Vec::new()),
            reviews_calls: Mutex::new(Vec::new()),
            check_suites_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            error_on_search: Mutex::new(None),
            error_on_details: Mutex::new(HashMap::new()),
            error_on_timeline: Mutex::new(None),
            error_on_reviews: Mutex::new(None),
            error_on_check_suites: Mutex::new(None),
            error_on_merge: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make `search_open_pull_requests` return an error
    pub fn fail_search(&self, msg: &str) {
        *self.error_on_search.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `get_pull_request` return an error for one pull request
    pub fn fail_details(&self, number: u64, msg: &str) {
        self.error_on_details
            .lock()
            .unwrap()
            .insert(number, msg.to_string());
    }

    /// Make `list_timeline_events` return an error
    pub fn fail_timeline(&self, msg: &str) {
        *self.error_on_timeline.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_reviews` return an error
    pub fn fail_reviews(&self, msg: &str) {
        *self.error_on_reviews.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_check_suites` return an error
    pub fn fail_check_suites(&self, msg: &str) {
        *self.error_on_check_suites.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pull_request` return an error
    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    // === Response setup ===

    /// Add a pull request to the search results
    pub fn add_search_result(&self, number: u64) {
        self.search_results.lock().unwrap().push(PullRequestSummary {
            html_url: pr_url(number),
            number,
            title: Some(format!("PR {number}")),
        });
    }

    /// Set the response for `get_pull_request`
    pub fn set_details(&self, number: u64, details: PullRequestDetails) {
        self.details.lock().unwrap().insert(number, details);
    }

    /// Set the response for `list_timeline_events`
    pub fn set_timeline(&self, number: u64, events: Vec<TimelineEvent>) {
        self.timelines.lock().unwrap().insert(number, events);
    }

    /// Set the response for `list_reviews`
    pub fn set_reviews(&self, number: u64, reviews: Vec<Review>) {
        self.reviews.lock().unwrap().insert(number, reviews);
    }

    /// Set the check suites of a commit
    pub fn set_check_suites(&self, sha: &str, suite_ids: Vec<u64>) {
        self.check_suites
            .lock()
            .unwrap()
            .insert(sha.to_string(), suite_ids);
    }

    /// Queue the runs returned by successive rounds for a suite
    pub fn set_check_run_rounds(&self, suite_id: u64, rounds: Vec<Vec<CheckRun>>) {
        self.check_run_rounds
            .lock()
            .unwrap()
            .insert(suite_id, rounds.into());
    }

    /// Set the response for `merge_pull_request`
    pub fn set_merge_response(&self, number: u64, result: MergeResult) {
        self.merge_responses.lock().unwrap().insert(number, result);
    }

    /// Set up an open, long-quiet pull request with approvals and green CI
    pub fn setup_mergeable_pr(&self, number: u64, association: &str, approvals: usize) {
        let sha = head_sha(number);
        self.add_search_result(number);
        self.set_details(number, open_details(&sha, association));
        self.set_timeline(number, vec![event_at("2020-01-01T00:00:00Z")]);
        self.set_reviews(number, vec![review("APPROVED", "MEMBER"); approvals]);
        self.set_check_suites(&sha, vec![number * 10]);
        self.set_check_run_rounds(
            number * 10,
            vec![vec![check_run("build", "completed", Some("success"))]],
        );
    }

    // === Call inspection ===

    /// Filters passed to each search call
    pub fn search_calls(&self) -> Vec<Vec<String>> {
        self.search_calls.lock().unwrap().clone()
    }

    /// Pull requests whose details were requested
    pub fn details_calls(&self) -> Vec<u64> {
        self.details_calls.lock().unwrap().clone()
    }

    /// Pull requests whose reviews were listed
    pub fn reviews_calls(&self) -> Vec<u64> {
        self.reviews_calls.lock().unwrap().clone()
    }

    /// Number of CI rounds (check suite listings)
    pub fn check_suites_call_count(&self) -> usize {
        self.check_suites_calls.lock().unwrap().len()
    }

    /// Pull requests merge was called for
    pub fn merge_calls(&self) -> Vec<u64> {
        self.merge_calls.lock().unwrap().clone()
    }
}

fn missing(what: &str, number: u64) -> Error {
    Error::Platform(format!("no {what} configured for #{number}"))
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn search_open_pull_requests(
        &self,
        filters: &[String],
    ) -> Result<Vec<PullRequestSummary>> {
        self.search_calls.lock().unwrap().push(filters.to_vec());
        if let Some(msg) = self.error_on_search.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(self.search_results.lock().unwrap().clone())
    }

    async fn get_pull_request(&self, pr: &PullRequestRef) -> Result<PullRequestDetails> {
        self.details_calls.lock().unwrap().push(pr.number);
        if let Some(msg) = self.error_on_details.lock().unwrap().get(&pr.number) {
            return Err(Error::Platform(msg.clone()));
        }
        self.details
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .ok_or_else(|| missing("details", pr.number))
    }

    async fn list_timeline_events(&self, pr: &PullRequestRef) -> Result<Vec<TimelineEvent>> {
        if let Some(msg) = self.error_on_timeline.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(self
            .timelines
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_reviews(&self, pr: &PullRequestRef) -> Result<Vec<Review>> {
        self.reviews_calls.lock().unwrap().push(pr.number);
        if let Some(msg) = self.error_on_reviews.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_check_suites(&self, _pr: &PullRequestRef, sha: &str) -> Result<Vec<u64>> {
        self.check_suites_calls.lock().unwrap().push(sha.to_string());
        if let Some(msg) = self.error_on_check_suites.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(self
            .check_suites
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_check_runs_for_suite(
        &self,
        _pr: &PullRequestRef,
        suite_id: u64,
    ) -> Result<Vec<CheckRun>> {
        let mut rounds = self.check_run_rounds.lock().unwrap();
        let Some(queue) = rounds.get_mut(&suite_id) else {
            return Ok(Vec::new());
        };
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap_or_default())
        } else {
            Ok(queue.front().cloned().unwrap_or_default())
        }
    }

    async fn merge_pull_request(&self, pr: &PullRequestRef) -> Result<MergeResult> {
        self.merge_calls.lock().unwrap().push(pr.number);
        if let Some(msg) = self.error_on_merge.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(self
            .merge_responses
            .lock()
            .unwrap()
            .get(&pr.number)
            .cloned()
            .unwrap_or_else(|| MergeResult {
                merged: true,
                sha: Some(format!("merge-{}", pr.number)),
                message: None,
            }))
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

// === Fixtures ===

/// URL of pull request `number` in the mock repository
pub fn pr_url(number: u64) -> String {
    format!("https://github.com/orgA/repoA/pull/{number}")
}

/// Head SHA used for pull request `number`
pub fn head_sha(number: u64) -> String {
    format!("sha{number}")
}

/// Details of an open pull request
pub fn open_details(sha: &str, association: &str) -> PullRequestDetails {
    PullRequestDetails {
        merged: false,
        closed: false,
        head_sha: sha.to_string(),
        author_association: association.to_string(),
    }
}

/// Timeline event created at `timestamp`
pub fn event_at(timestamp: &str) -> TimelineEvent {
    TimelineEvent {
        event: Some("commented".to_string()),
        created_at: Some(timestamp.to_string()),
        ..TimelineEvent::default()
    }
}

/// A review
pub fn review(state: &str, association: &str) -> Review {
    Review {
        state: state.to_string(),
        author_association: association.to_string(),
    }
}

/// A check run
pub fn check_run(name: &str, status: &str, conclusion: Option<&str>) -> CheckRun {
    CheckRun {
        name: name.to_string(),
        status: status.to_string(),
        conclusion: conclusion.map(str::to_string),
    }
}
