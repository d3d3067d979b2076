//! Eligibility policy: tier resolution and the due check
//!
//! Pure functions only. Duration strings are parsed when the policy is built,
//! so a malformed timeout aborts before any pull request is looked at.

use crate::config::{Settings, parse_duration};
use crate::error::Result;
use crate::types::Tier;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Requirements that apply to one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    /// Tier the author association resolved to
    pub tier: Tier,
    /// Inactivity period before the pull request is due
    pub merge_timeout: Duration,
    /// Minimum number of qualifying approvals
    pub required_approvals: u32,
}

/// Resolved eligibility policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityPolicy {
    collaborator: Requirements,
    contributor: Requirements,
    allowed_roles: Vec<String>,
}

impl EligibilityPolicy {
    /// Build the policy, parsing both tier timeouts
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            collaborator: Requirements {
                tier: Tier::Collaborator,
                merge_timeout: parse_duration(&settings.merge_timeout.collaborator)?,
                required_approvals: settings.approvals_required.collaborator,
            },
            contributor: Requirements {
                tier: Tier::Contributor,
                merge_timeout: parse_duration(&settings.merge_timeout.contributor)?,
                required_approvals: settings.approvals_required.contributor,
            },
            allowed_roles: settings
                .allowed_reviewer_roles
                .iter()
                .map(|r| r.trim().to_uppercase())
                .collect(),
        })
    }

    /// Whether an association label is on the allow-list (case-insensitive)
    pub fn is_allowed(&self, association: &str) -> bool {
        let association = association.trim().to_uppercase();
        self.allowed_roles.iter().any(|r| *r == association)
    }

    /// Tier for an author association
    pub fn tier_for(&self, association: &str) -> Tier {
        if self.is_allowed(association) {
            Tier::Collaborator
        } else {
            Tier::Contributor
        }
    }

    /// Requirements for a tier
    pub const fn requirements_for_tier(&self, tier: Tier) -> Requirements {
        match tier {
            Tier::Collaborator => self.collaborator,
            Tier::Contributor => self.contributor,
        }
    }

    /// Requirements for an author association
    pub fn requirements(&self, association: &str) -> Requirements {
        self.requirements_for_tier(self.tier_for(association))
    }
}

/// Whether `now` is strictly past `last_activity + merge_timeout`.
///
/// Unknown activity counts as due. A deadline beyond chrono's range is
/// never reached.
pub fn is_past_due(
    last_activity: Option<DateTime<Utc>>,
    merge_timeout: Duration,
    now: DateTime<Utc>,
) -> bool {
    let Some(last_activity) = last_activity else {
        return true;
    };

    TimeDelta::from_std(merge_timeout)
        .ok()
        .and_then(|timeout| last_activity.checked_add_signed(timeout))
        .is_some_and(|deadline| now > deadline)
}
