//! Shared test utilities

#![allow(dead_code)]

pub mod mock_platform;

pub use mock_platform::*;

use pr_automerge::config::Settings;
use pr_automerge::types::PlatformConfig;

/// Platform config for the `orgA/repoA` test repository
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "orgA".to_string(),
        repo: "repoA".to_string(),
        api_url: None,
    }
}

/// Settings requiring `collaborator`/`contributor` approvals
pub fn settings_with_approvals(collaborator: u32, contributor: u32) -> Settings {
    let mut settings = Settings::default();
    settings.approvals_required.collaborator = collaborator;
    settings.approvals_required.contributor = contributor;
    settings
}
