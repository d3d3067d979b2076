//! Engine settings
//!
//! Every field has a default, so an empty document (`{}`) is a valid
//! configuration. Settings are validated once, up front; a run never starts
//! with a malformed configuration.

mod duration;

pub use duration::parse_duration;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Approvals required before a pull request may be merged, per tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalsRequired {
    /// Pull requests authored by allow-listed associations
    pub collaborator: u32,
    /// Everyone else
    pub contributor: u32,
}

impl Default for ApprovalsRequired {
    fn default() -> Self {
        Self {
            collaborator: 1,
            contributor: 2,
        }
    }
}

/// Inactivity period before a pull request may be merged, per tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeTimeout {
    /// Pull requests authored by allow-listed associations
    pub collaborator: String,
    /// Everyone else
    pub contributor: String,
}

impl Default for MergeTimeout {
    fn default() -> Self {
        Self {
            collaborator: "3.5 days".to_string(),
            contributor: "7 days".to_string(),
        }
    }
}

/// Organizations and repositories to watch or skip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReposSettings {
    /// `org` or `org/repo` targets to watch
    pub monitor: Vec<String>,
    /// `org` or `org/repo` targets to exclude
    pub ignore: Vec<String>,
}

/// CI polling behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CiSettings {
    /// Maximum number of CI status rounds per pull request
    pub max_attempts: u32,
    /// Pause between rounds (duration string)
    pub delay: String,
}

impl Default for CiSettings {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            delay: "1 minute".to_string(),
        }
    }
}

impl CiSettings {
    /// Parsed delay between rounds
    pub fn delay(&self) -> Result<Duration> {
        parse_duration(&self.delay)
    }
}

fn default_reviewer_roles() -> Vec<String> {
    vec![
        "COLLABORATOR".to_string(),
        "MEMBER".to_string(),
        "OWNER".to_string(),
    ]
}

/// Complete engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Approval thresholds
    pub approvals_required: ApprovalsRequired,
    /// Inactivity timeouts
    pub merge_timeout: MergeTimeout,
    /// Watched and ignored targets
    pub repos: ReposSettings,
    /// Associations whose authors are collaborators and whose reviews count
    #[serde(default = "default_reviewer_roles")]
    pub allowed_reviewer_roles: Vec<String>,
    /// CI polling
    pub ci: CiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            approvals_required: ApprovalsRequired::default(),
            merge_timeout: MergeTimeout::default(),
            repos: ReposSettings::default(),
            allowed_reviewer_roles: default_reviewer_roles(),
            ci: CiSettings::default(),
        }
    }
}

impl Settings {
    /// Parse, normalize and validate settings from a JSON document
    pub fn from_json(content: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse settings: {e}")))?;
        settings.finish()
    }

    /// Parse, normalize and validate settings from a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse settings: {e}")))?;
        settings.finish()
    }

    /// Load settings from a file, choosing the format by extension
    ///
    /// `.json` files are read as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    fn finish(mut self) -> Result<Self> {
        self.normalize();
        self.validate()?;
        Ok(self)
    }

    /// Upper-case reviewer roles so association comparisons are case-insensitive
    pub fn normalize(&mut self) {
        for role in &mut self.allowed_reviewer_roles {
            *role = role.trim().to_uppercase();
        }
    }

    /// Check every constraint, reporting all violations at once
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        for (path, value) in [
            ("approvalsRequired.collaborator", self.approvals_required.collaborator),
            ("approvalsRequired.contributor", self.approvals_required.contributor),
        ] {
            if value < 1 {
                errors.push(format!(
                    "{path}: expected number to be greater or equal to 1"
                ));
            }
        }

        for (path, value) in [
            ("mergeTimeout.collaborator", &self.merge_timeout.collaborator),
            ("mergeTimeout.contributor", &self.merge_timeout.contributor),
            ("ci.delay", &self.ci.delay),
        ] {
            if let Err(e) = parse_duration(value) {
                errors.push(format!("{path}: {e}"));
            }
        }

        for (i, target) in self.repos.monitor.iter().enumerate() {
            if target.trim().is_empty() {
                errors.push(format!(
                    "repos.monitor.{i}: expected string length greater or equal to 1"
                ));
            }
        }

        if self.ci.max_attempts < 1 {
            errors.push("ci.maxAttempts: expected number to be greater or equal to 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(errors.join(";\n")))
        }
    }
}
