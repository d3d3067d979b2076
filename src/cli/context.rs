//! Shared command context for CLI commands
//!
//! Resolves settings, the acting repository, credentials and the tracking
//! store once for both `run` and `event`.

use clap::Args;
use pr_automerge::auth::get_github_auth;
use pr_automerge::config::Settings;
use pr_automerge::error::{Error, Result};
use pr_automerge::merge::MergeEngine;
use pr_automerge::platform::{GitHubService, PlatformService};
use pr_automerge::tracking::{FileStore, PullRequestStore, default_tracking_path};
use pr_automerge::types::PlatformConfig;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Arguments shared by every command
#[derive(Debug, Clone, Default, Args)]
pub struct ContextArgs {
    /// Settings file (TOML, or JSON with a `.json` extension)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline JSON settings, used when no --config is given
    #[arg(long, global = true, env = "AUTOMERGE_SETTINGS", hide_env_values = true)]
    pub settings: Option<String>,

    /// Repository the engine acts for, as `owner/repo`
    #[arg(long, global = true, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Name of the workflow running the engine; its own check runs are ignored
    #[arg(long, global = true, env = "GITHUB_WORKFLOW")]
    pub workflow: Option<String>,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long, global = true, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Tracking state file [default: platform data directory]
    #[arg(long, global = true, env = "AUTOMERGE_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// File the markdown merge report is appended to
    #[arg(long, global = true, env = "GITHUB_STEP_SUMMARY")]
    pub summary_file: Option<PathBuf>,
}

/// Shared context for CLI commands that talk to GitHub
pub struct CommandContext {
    /// Validated settings
    pub settings: Settings,
    /// Platform service
    pub platform: Box<dyn PlatformService>,
    /// Tracking store, if a location could be resolved
    pub store: Option<FileStore>,
    /// Workflow name excluded from the CI gate
    pub workflow_name: String,
    /// Where to append the merge report
    pub summary_path: Option<PathBuf>,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// Settings are validated before any credentials are looked up.
    pub async fn new(args: &ContextArgs) -> Result<Self> {
        let settings = load_settings(args)?;

        let slug = args.repository.as_deref().ok_or_else(|| {
            Error::Config("repository: set GITHUB_REPOSITORY or pass --repository".to_string())
        })?;
        let platform_config = PlatformConfig::from_slug(slug, args.api_url.clone())?;

        let auth = get_github_auth().await?;
        debug!(source = ?auth.source, "resolved GitHub token");
        let platform = Box::new(GitHubService::new(&auth.token, platform_config)?);

        let store = match args.state_file.clone().or_else(default_tracking_path) {
            Some(path) => Some(FileStore::new(path)),
            None => {
                warn!("no data directory available, pull requests will not be tracked");
                None
            }
        };

        Ok(Self {
            settings,
            platform,
            store,
            workflow_name: args.workflow.clone().unwrap_or_default(),
            summary_path: args.summary_file.clone(),
        })
    }

    /// Tracking store as a trait object
    pub fn store(&self) -> Option<&dyn PullRequestStore> {
        self.store.as_ref().map(|s| s as &dyn PullRequestStore)
    }

    /// Build a merge engine over this context
    pub fn engine(&self, dry_run: bool) -> Result<MergeEngine<'_>> {
        let engine = MergeEngine::new(self.platform.as_ref(), &self.settings, &self.workflow_name)?
            .dry_run(dry_run);
        Ok(match self.store() {
            Some(store) => engine.with_store(store),
            None => engine,
        })
    }
}

/// Settings from `--config`, else `--settings`, else the defaults
pub fn load_settings(args: &ContextArgs) -> Result<Settings> {
    if let Some(path) = &args.config {
        return Settings::load(path);
    }
    match args.settings.as_deref().map(str::trim) {
        Some(json) if !json.is_empty() => Settings::from_json(json),
        _ => {
            let settings = Settings::default();
            settings.validate()?;
            Ok(settings)
        }
    }
}
