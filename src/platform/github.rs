//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    CheckRun, MergeResult, PlatformConfig, PullRequestDetails, PullRequestRef,
    PullRequestSummary, Review, TimelineEvent,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size for every listing call (GitHub's maximum)
const PER_PAGE: usize = 100;

/// The search API serves at most 1000 results
const MAX_SEARCH_PAGES: u32 = 10;

/// Upper bound for other listings
const MAX_PAGES: u32 = 100;

/// What to do when the page limit is hit and the last page was full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageLimit {
    /// Return what was fetched (the search API stops at 1000 results anyway)
    Truncate,
    /// Fail; a partial listing would misstate the pull request
    Fail,
}

/// A JSON page whose items can be extracted
trait Paged: DeserializeOwned {
    type Item;

    fn into_items(self) -> Vec<Self::Item>;
}

impl<T: DeserializeOwned> Paged for Vec<T> {
    type Item = T;

    fn into_items(self) -> Vec<T> {
        self
    }
}

#[derive(Deserialize)]
struct SearchPage {
    items: Vec<PullRequestSummary>,
}

impl Paged for SearchPage {
    type Item = PullRequestSummary;

    fn into_items(self) -> Vec<PullRequestSummary> {
        self.items
    }
}

#[derive(Deserialize)]
struct CheckSuite {
    id: u64,
}

#[derive(Deserialize)]
struct CheckSuitesPage {
    check_suites: Vec<CheckSuite>,
}

impl Paged for CheckSuitesPage {
    type Item = CheckSuite;

    fn into_items(self) -> Vec<CheckSuite> {
        self.check_suites
    }
}

#[derive(Deserialize)]
struct CheckRunsPage {
    check_runs: Vec<CheckRun>,
}

impl Paged for CheckRunsPage {
    type Item = CheckRun;

    fn into_items(self) -> Vec<CheckRun> {
        self.check_runs
    }
}

/// GitHub service using octocrab
///
/// Pull request reads and merges go through octocrab; the paginated
/// listings (search, timeline, reviews, checks) use raw REST calls so that
/// only the fields the engine reads need to deserialize.
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// API base URL for raw requests, without trailing slash
    api_url: String,
}

impl GitHubService {
    /// Create a new GitHub service acting on behalf of `config`'s repository
    pub fn new(token: &str, config: PlatformConfig) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        let api_url = if let Some(ref url) = config.api_url {
            let url = url.trim_end_matches('/').to_string();
            builder = builder
                .base_uri(url.as_str())
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
            url
        } else {
            DEFAULT_API_URL.to_string()
        };

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("pr-automerge")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            token: token.to_string(),
            http_client,
            api_url,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{path}", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to fetch {path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!("{path} returned {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse {path}: {e}")))
    }

    /// Fetch pages until a short page comes back
    async fn get_all_pages<P: Paged>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        max_pages: u32,
        on_limit: PageLimit,
    ) -> Result<Vec<P::Item>> {
        let per_page = PER_PAGE.to_string();
        let mut items = Vec::new();

        for page in 1..=max_pages {
            let page_number = page.to_string();
            let mut query = params.to_vec();
            query.push(("per_page", per_page.as_str()));
            query.push(("page", page_number.as_str()));

            let batch = self.get_json::<P>(path, &query).await?.into_items();
            let batch_len = batch.len();
            items.extend(batch);

            if batch_len < PER_PAGE {
                return Ok(items);
            }
        }

        match on_limit {
            PageLimit::Truncate => {
                warn!(path, max_pages, "page limit reached, listing may be incomplete");
                Ok(items)
            }
            PageLimit::Fail => Err(Error::GitHubApi(format!(
                "{path} has more than {max_pages} pages, refusing a partial listing"
            ))),
        }
    }
}

/// Build the search query for open, non-draft pull requests
fn search_query(filters: &[String]) -> String {
    let mut parts = vec!["is:pr", "is:open", "draft:false"];
    parts.extend(filters.iter().map(String::as_str));
    parts.join(" ")
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn search_open_pull_requests(
        &self,
        filters: &[String],
    ) -> Result<Vec<PullRequestSummary>> {
        let query = search_query(filters);
        debug!(%query, "searching pull requests");

        let results = self
            .get_all_pages::<SearchPage>(
                "/search/issues",
                &[("q", query.as_str())],
                MAX_SEARCH_PAGES,
                PageLimit::Truncate,
            )
            .await?;

        debug!(count = results.len(), "search complete");
        Ok(results)
    }

    async fn get_pull_request(&self, pr: &PullRequestRef) -> Result<PullRequestDetails> {
        debug!(%pr, "getting PR details");

        let details = self
            .client
            .pulls(&pr.owner, &pr.repo)
            .get(pr.number)
            .await?;

        // AuthorAssociation serializes to GitHub's SCREAMING_SNAKE_CASE label
        let author_association = details
            .author_association
            .as_ref()
            .and_then(|a| serde_json::to_value(a).ok())
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_else(|| "NONE".to_string());

        let result = PullRequestDetails {
            merged: details.merged_at.is_some(),
            closed: details.closed_at.is_some()
                || matches!(details.state, Some(octocrab::models::IssueState::Closed)),
            head_sha: details.head.sha.clone(),
            author_association,
        };

        debug!(%pr, merged = result.merged, closed = result.closed, "got PR details");
        Ok(result)
    }

    async fn list_timeline_events(&self, pr: &PullRequestRef) -> Result<Vec<TimelineEvent>> {
        debug!(%pr, "listing timeline events");
        let path = format!("/repos/{}/{}/issues/{}/timeline", pr.owner, pr.repo, pr.number);

        let events = self
            .get_all_pages::<Vec<TimelineEvent>>(&path, &[], MAX_PAGES, PageLimit::Fail)
            .await?;

        debug!(%pr, count = events.len(), "listed timeline events");
        Ok(events)
    }

    async fn list_reviews(&self, pr: &PullRequestRef) -> Result<Vec<Review>> {
        debug!(%pr, "listing reviews");
        let path = format!("/repos/{}/{}/pulls/{}/reviews", pr.owner, pr.repo, pr.number);

        let reviews = self
            .get_all_pages::<Vec<Review>>(&path, &[], MAX_PAGES, PageLimit::Fail)
            .await?;

        debug!(%pr, count = reviews.len(), "listed reviews");
        Ok(reviews)
    }

    async fn list_check_suites(&self, pr: &PullRequestRef, sha: &str) -> Result<Vec<u64>> {
        debug!(%pr, sha, "listing check suites");
        let path = format!("/repos/{}/{}/commits/{sha}/check-suites", pr.owner, pr.repo);

        let suites = self
            .get_all_pages::<CheckSuitesPage>(&path, &[], MAX_PAGES, PageLimit::Fail)
            .await?;

        Ok(suites.into_iter().map(|s| s.id).collect())
    }

    async fn list_check_runs_for_suite(
        &self,
        pr: &PullRequestRef,
        suite_id: u64,
    ) -> Result<Vec<CheckRun>> {
        debug!(%pr, suite_id, "listing check runs");
        let path = format!(
            "/repos/{}/{}/check-suites/{suite_id}/check-runs",
            pr.owner, pr.repo
        );

        self.get_all_pages::<CheckRunsPage>(&path, &[], MAX_PAGES, PageLimit::Fail)
            .await
    }

    async fn merge_pull_request(&self, pr: &PullRequestRef) -> Result<MergeResult> {
        debug!(%pr, "merging PR");

        let result = self
            .client
            .pulls(&pr.owner, &pr.repo)
            .merge(pr.number)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Merge failed: {e}")))?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            %pr,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
