//! CI gate: poll check runs until they settle
//!
//! Each round lists the check suites of the head commit and every run in
//! them. Runs named after the engine's own workflow are ignored, otherwise
//! the engine would wait for itself.

use crate::config::CiSettings;
use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{CheckRun, CiStatus, PullRequestRef};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Classify one round of check runs.
///
/// Any non-`completed` run keeps the round pending. Completed runs pass on
/// `success` or `skipped`; any other conclusion (including `neutral`), or
/// none at all, is red.
pub fn evaluate_check_runs(runs: &[CheckRun], workflow_name: &str) -> CiStatus {
    let relevant: Vec<&CheckRun> = runs.iter().filter(|r| r.name != workflow_name).collect();

    if relevant.iter().any(|r| r.status != "completed") {
        return CiStatus::Pending;
    }

    let failed = relevant.iter().find(|r| {
        !matches!(
            r.conclusion.as_deref(),
            Some("success" | "skipped")
        )
    });
    if let Some(run) = failed {
        debug!(name = %run.name, conclusion = ?run.conclusion, "check run failed");
        return CiStatus::Red;
    }

    CiStatus::Green
}

/// Bounded CI polling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiGate {
    max_attempts: u32,
    delay: Duration,
    workflow_name: String,
}

impl CiGate {
    /// Create a gate polling up to `max_attempts` rounds, `delay` apart
    pub fn new(max_attempts: u32, delay: Duration, workflow_name: impl Into<String>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            workflow_name: workflow_name.into(),
        }
    }

    /// Create a gate from CI settings
    pub fn from_settings(settings: &CiSettings, workflow_name: impl Into<String>) -> Result<Self> {
        Ok(Self::new(settings.max_attempts, settings.delay()?, workflow_name))
    }

    /// Maximum number of rounds
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run a single round
    pub async fn check_once(
        &self,
        platform: &dyn PlatformService,
        pr: &PullRequestRef,
        sha: &str,
    ) -> Result<CiStatus> {
        let mut runs = Vec::new();
        for suite_id in platform.list_check_suites(pr, sha).await? {
            runs.extend(platform.list_check_runs_for_suite(pr, suite_id).await?);
        }
        Ok(evaluate_check_runs(&runs, &self.workflow_name))
    }

    /// Poll until green or red, or until the attempt budget runs out.
    ///
    /// Exhausting the budget returns `Pending`; the pull request is picked up
    /// again by the next run. Transport errors return `Red`.
    pub async fn wait_for_result(
        &self,
        platform: &dyn PlatformService,
        pr: &PullRequestRef,
        sha: &str,
    ) -> CiStatus {
        for attempt in 1..=self.max_attempts {
            match self.check_once(platform, pr, sha).await {
                Ok(CiStatus::Pending) => {
                    debug!(%pr, attempt, max_attempts = self.max_attempts, "CI still pending");
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Ok(status) => {
                    debug!(%pr, attempt, %status, "CI settled");
                    return status;
                }
                Err(e) => {
                    warn!(%pr, attempt, error = %e, "CI status check failed, treating as red");
                    return CiStatus::Red;
                }
            }
        }

        info!(%pr, attempts = self.max_attempts, "CI did not settle, will retry next run");
        CiStatus::Pending
    }
}
