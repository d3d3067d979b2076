//! Merge orchestration - effectful operations
//!
//! Walks every discovered pull request through the gates in a fixed order:
//! state, due date, approvals, CI, merge. Each pull request is isolated; an
//! error on one is logged and recorded as not merged.

use crate::config::{ReposSettings, Settings};
use crate::error::Result;
use crate::merge::activity::last_activity;
use crate::merge::approvals::count_approvals;
use crate::merge::ci::CiGate;
use crate::merge::discover::discover_pull_requests;
use crate::merge::policy::{EligibilityPolicy, is_past_due};
use crate::platform::PlatformService;
use crate::tracking::{PullRequestStore, TrackedPullRequest};
use crate::types::{CiStatus, PullRequestRef, RunOutcome, Tier};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Why a pull request was or wasn't merged this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Already merged or closed, nothing to do
    AlreadyClosed,
    /// Waiting period has not elapsed yet
    NotDue {
        /// Tier the author resolved to
        tier: Tier,
        /// Last activity seen
        last_activity: Option<DateTime<Utc>>,
    },
    /// Not enough qualifying approvals
    InsufficientApprovals {
        /// Tier the author resolved to
        tier: Tier,
        /// Qualifying approvals found
        approvals: u32,
        /// Approvals required for the tier
        required: u32,
    },
    /// CI did not come back green
    CiNotGreen(CiStatus),
    /// All gates passed but dry run mode is on
    WouldMerge,
    /// Merge API accepted the merge
    Merged {
        /// Merge commit SHA
        sha: Option<String>,
    },
    /// Merge API answered but did not merge
    MergeRejected {
        /// Message returned by the platform
        message: Option<String>,
    },
}

impl Decision {
    /// Whether the pull request was merged by this run
    pub const fn merged(&self) -> bool {
        matches!(self, Self::Merged { .. })
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyClosed => write!(f, "already merged or closed, nothing to do"),
            Self::NotDue {
                tier,
                last_activity: Some(at),
            } => write!(f, "not due yet ({tier}, last activity {at})"),
            Self::NotDue { tier, .. } => write!(f, "not due yet ({tier})"),
            Self::InsufficientApprovals {
                tier,
                approvals,
                required,
            } => write!(
                f,
                "insufficient approvals ({approvals}/{required} for {tier})"
            ),
            Self::CiNotGreen(status) => write!(f, "CI is {status}, won't merge"),
            Self::WouldMerge => write!(f, "would merge (dry run)"),
            Self::Merged { sha: Some(sha) } => write!(f, "merged ({sha})"),
            Self::Merged { sha: None } => write!(f, "merged"),
            Self::MergeRejected {
                message: Some(message),
            } => write!(f, "merge rejected: {message}"),
            Self::MergeRejected { message: None } => write!(f, "merge rejected"),
        }
    }
}

/// The merge-eligibility decision engine
pub struct MergeEngine<'a> {
    platform: &'a dyn PlatformService,
    policy: EligibilityPolicy,
    ci_gate: CiGate,
    repos: ReposSettings,
    store: Option<&'a dyn PullRequestStore>,
    dry_run: bool,
}

impl<'a> MergeEngine<'a> {
    /// Build an engine from validated settings.
    ///
    /// `workflow_name` is the name of the engine's own CI workflow, whose
    /// runs are left out of the CI gate. Fails on unparseable durations.
    pub fn new(
        platform: &'a dyn PlatformService,
        settings: &Settings,
        workflow_name: &str,
    ) -> Result<Self> {
        Ok(Self {
            platform,
            policy: EligibilityPolicy::from_settings(settings)?,
            ci_gate: CiGate::from_settings(&settings.ci, workflow_name)?,
            repos: settings.repos.clone(),
            store: None,
            dry_run: false,
        })
    }

    /// Record last activity and forget merged pull requests in `store`
    #[must_use]
    pub fn with_store(mut self, store: &'a dyn PullRequestStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Evaluate every gate but never call merge
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replace the CI gate (e.g. to shorten polling)
    #[must_use]
    pub fn with_ci_gate(mut self, ci_gate: CiGate) -> Self {
        self.ci_gate = ci_gate;
        self
    }

    /// Run one pass over every open pull request.
    ///
    /// Discovery failures abort the run. Everything after discovery is
    /// isolated per pull request.
    pub async fn run(&self) -> Result<Vec<RunOutcome>> {
        let pull_requests = discover_pull_requests(self.platform, &self.repos).await?;

        if pull_requests.is_empty() {
            info!("Nothing to do.");
        }

        let mut outcomes = Vec::with_capacity(pull_requests.len());
        for pr in &pull_requests {
            let merged = match self.process_pull_request(&pr.html_url).await {
                Ok(decision) => {
                    info!(url = %pr.html_url, %decision, "processed pull request");
                    decision.merged()
                }
                Err(e) => {
                    error!(
                        url = %pr.html_url,
                        error = %e,
                        "could not process pull request for auto-merge"
                    );
                    false
                }
            };
            outcomes.push(RunOutcome {
                url: pr.html_url.clone(),
                merged,
            });
        }

        let merged = outcomes.iter().filter(|o| o.merged).count();
        info!(processed = outcomes.len(), merged, "merge pass complete");
        Ok(outcomes)
    }

    /// Take one pull request through every gate.
    ///
    /// Merge is called at most once, and only after the pull request is past
    /// due, has enough approvals and CI is green.
    pub async fn process_pull_request(&self, url: &str) -> Result<Decision> {
        let pr = PullRequestRef::parse(url)?;
        debug!(%pr, "processing pull request");

        let details = self.platform.get_pull_request(&pr).await?;
        if details.merged || details.closed {
            self.forget(url);
            return Ok(Decision::AlreadyClosed);
        }

        let last_activity = last_activity(self.platform, &pr).await?;
        let requirements = self.policy.requirements(&details.author_association);

        if !is_past_due(last_activity, requirements.merge_timeout, Utc::now()) {
            self.remember(url, last_activity);
            return Ok(Decision::NotDue {
                tier: requirements.tier,
                last_activity,
            });
        }
        if last_activity.is_none() {
            info!(%pr, "no timestamped activity found, treating as due");
        }

        let approvals = count_approvals(self.platform, &pr, &self.policy).await;
        if approvals < requirements.required_approvals {
            return Ok(Decision::InsufficientApprovals {
                tier: requirements.tier,
                approvals,
                required: requirements.required_approvals,
            });
        }

        let ci_status = self
            .ci_gate
            .wait_for_result(self.platform, &pr, &details.head_sha)
            .await;
        if ci_status != CiStatus::Green {
            return Ok(Decision::CiNotGreen(ci_status));
        }

        if self.dry_run {
            return Ok(Decision::WouldMerge);
        }

        info!(%pr, ?last_activity, "pull request is past its due date, merging");
        let result = self.platform.merge_pull_request(&pr).await?;
        if result.merged {
            self.forget(url);
            Ok(Decision::Merged { sha: result.sha })
        } else {
            Ok(Decision::MergeRejected {
                message: result.message,
            })
        }
    }

    fn remember(&self, url: &str, last_activity: Option<DateTime<Utc>>) {
        let Some(store) = self.store else {
            return;
        };
        match store.put(TrackedPullRequest::with_activity(url, last_activity)) {
            Ok(()) => debug!(url, ?last_activity, "updated tracked pull request"),
            Err(e) => warn!(url, error = %e, "failed to update tracked pull request"),
        }
    }

    fn forget(&self, url: &str) {
        let Some(store) = self.store else {
            return;
        };
        if let Err(e) = store.delete(url) {
            warn!(url, error = %e, "failed to delete tracked pull request");
        }
    }
}
