//! Repository event dispatch
//!
//! Pull request lifecycle events keep the tracking store current; scheduled
//! and push-style events run a merge pass. Anything else is skipped.

use crate::error::{Error, Result};
use crate::merge::MergeEngine;
use crate::tracking::{PullRequestStore, TrackedPullRequest};
use crate::types::{PullRequestRef, RunOutcome};
use serde::Deserialize;
use std::fmt;
use tracing::{info, warn};

/// Reason reported for events with no handler
pub const UNSUPPORTED_EVENT: &str = "unsupported_event";

/// Events the engine knows how to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubEvent {
    /// `pull_request.opened`
    PullRequestOpened,
    /// `pull_request.reopened`
    PullRequestReopened,
    /// `pull_request.closed`
    PullRequestClosed,
    /// `schedule`
    Schedule,
    /// `workflow_dispatch`
    WorkflowDispatch,
    /// `push`
    Push,
    /// Any other event name
    Unsupported(String),
}

impl GitHubEvent {
    /// Classify an event name such as `pull_request.opened`
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "pull_request.opened" => Self::PullRequestOpened,
            "pull_request.reopened" => Self::PullRequestReopened,
            "pull_request.closed" => Self::PullRequestClosed,
            "schedule" => Self::Schedule,
            "workflow_dispatch" => Self::WorkflowDispatch,
            "push" => Self::Push,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Classify a workflow event name, qualifying it with the payload action.
    ///
    /// `GITHUB_EVENT_NAME` carries `pull_request` while the action lives in
    /// the payload; names that already contain a `.` are taken as-is.
    pub fn from_parts(name: &str, action: Option<&str>) -> Self {
        match action {
            Some(action) if !name.contains('.') => Self::parse(&format!("{name}.{action}")),
            _ => Self::parse(name),
        }
    }
}

impl fmt::Display for GitHubEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PullRequestOpened => write!(f, "pull_request.opened"),
            Self::PullRequestReopened => write!(f, "pull_request.reopened"),
            Self::PullRequestClosed => write!(f, "pull_request.closed"),
            Self::Schedule => write!(f, "schedule"),
            Self::WorkflowDispatch => write!(f, "workflow_dispatch"),
            Self::Push => write!(f, "push"),
            Self::Unsupported(name) => write!(f, "{name}"),
        }
    }
}

/// The part of an event payload the handlers read
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    /// Activity type, e.g. `opened`
    #[serde(default)]
    pub action: Option<String>,
    /// Present on `pull_request.*` events
    #[serde(default)]
    pub pull_request: Option<PayloadPullRequest>,
}

/// Pull request object of an event payload
#[derive(Debug, Clone, Deserialize)]
pub struct PayloadPullRequest {
    /// Web URL of the pull request
    pub html_url: String,
}

impl EventPayload {
    /// Parse a JSON payload
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Event(e.to_string()))
    }

    fn pull_request_url(&self) -> Result<&str> {
        let url = self
            .pull_request
            .as_ref()
            .map(|pr| pr.html_url.as_str())
            .ok_or_else(|| Error::Event("missing pull_request.html_url".to_string()))?;
        PullRequestRef::parse(url)?;
        Ok(url)
    }
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Pull request added to the tracking store
    Tracked(String),
    /// Pull request removed from the tracking store
    Untracked {
        /// Pull request URL
        url: String,
        /// Whether it was tracked before
        was_tracked: bool,
    },
    /// A merge pass ran
    MergePass(Vec<RunOutcome>),
    /// Nothing was done
    Skipped {
        /// Machine-readable reason
        reason: String,
    },
}

/// Dispatch one event.
///
/// Lifecycle events without a store are skipped rather than failed.
pub async fn handle_event(
    event: &GitHubEvent,
    payload: &EventPayload,
    engine: &MergeEngine<'_>,
    store: Option<&dyn PullRequestStore>,
) -> Result<EventOutcome> {
    info!(%event, "handling event");

    match event {
        GitHubEvent::PullRequestOpened | GitHubEvent::PullRequestReopened => {
            let url = payload.pull_request_url()?;
            let Some(store) = store else {
                return Ok(skipped("no_store"));
            };
            store.put(TrackedPullRequest::new(url))?;
            Ok(EventOutcome::Tracked(url.to_string()))
        }
        GitHubEvent::PullRequestClosed => {
            let url = payload.pull_request_url()?;
            let Some(store) = store else {
                return Ok(skipped("no_store"));
            };
            let was_tracked = store.delete(url)?;
            Ok(EventOutcome::Untracked {
                url: url.to_string(),
                was_tracked,
            })
        }
        GitHubEvent::Schedule | GitHubEvent::WorkflowDispatch | GitHubEvent::Push => {
            Ok(EventOutcome::MergePass(engine.run().await?))
        }
        GitHubEvent::Unsupported(name) => {
            warn!(event = %name, "event is not supported, skipping");
            Ok(skipped(UNSUPPORTED_EVENT))
        }
    }
}

fn skipped(reason: &str) -> EventOutcome {
    EventOutcome::Skipped {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_names() {
        assert_eq!(GitHubEvent::parse("pull_request.opened"), GitHubEvent::PullRequestOpened);
        assert_eq!(GitHubEvent::parse("pull_request.reopened"), GitHubEvent::PullRequestReopened);
        assert_eq!(GitHubEvent::parse("pull_request.closed"), GitHubEvent::PullRequestClosed);
        assert_eq!(GitHubEvent::parse("schedule"), GitHubEvent::Schedule);
        assert_eq!(GitHubEvent::parse("workflow_dispatch"), GitHubEvent::WorkflowDispatch);
        assert_eq!(GitHubEvent::parse("push"), GitHubEvent::Push);
        assert_eq!(
            GitHubEvent::parse("issues.opened"),
            GitHubEvent::Unsupported("issues.opened".to_string())
        );
    }

    #[test]
    fn test_from_parts_qualifies_with_action() {
        assert_eq!(
            GitHubEvent::from_parts("pull_request", Some("closed")),
            GitHubEvent::PullRequestClosed
        );
        assert_eq!(
            GitHubEvent::from_parts("pull_request.opened", Some("closed")),
            GitHubEvent::PullRequestOpened
        );
        assert_eq!(GitHubEvent::from_parts("schedule", None), GitHubEvent::Schedule);
        assert_eq!(
            GitHubEvent::from_parts("pull_request", Some("labeled")),
            GitHubEvent::Unsupported("pull_request.labeled".to_string())
        );
    }

    #[test]
    fn test_display_roundtrips_name() {
        for name in ["pull_request.opened", "schedule", "issue_comment.created"] {
            assert_eq!(GitHubEvent::parse(name).to_string(), name);
        }
    }

    #[test]
    fn test_payload_url() {
        let payload = EventPayload::from_json(
            r#"{ "pull_request": { "html_url": "https://github.com/o/r/pull/1", "number": 1 } }"#,
        )
        .unwrap();
        assert_eq!(payload.pull_request_url().unwrap(), "https://github.com/o/r/pull/1");
    }

    #[test]
    fn test_payload_without_pull_request() {
        let payload = EventPayload::from_json("{}").unwrap();
        assert!(matches!(payload.pull_request_url(), Err(Error::Event(_))));
    }

    #[test]
    fn test_payload_with_bad_url() {
        let json = r#"{ "pull_request": { "html_url": "https://github.com/o/r" } }"#;
        let payload = EventPayload::from_json(json).unwrap();
        assert!(matches!(payload.pull_request_url(), Err(Error::InvalidUrl(_))));
    }
}
