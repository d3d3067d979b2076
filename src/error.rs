//! Error types for pr-automerge

use thiserror::Error;

/// Errors produced by the merge engine and its collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// GitHub API request failed (transport or non-success status)
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Error from octocrab
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Generic platform error (used by alternative platform implementations)
    #[error("platform error: {0}")]
    Platform(String),

    /// Settings failed validation
    #[error("invalid settings provided:\n{0}")]
    Config(String),

    /// Pull request locator does not have the `/{owner}/{repo}/pull/{number}` shape
    #[error("invalid pull request url: [{0}]")]
    InvalidUrl(String),

    /// Duration string could not be parsed
    #[error("invalid duration format: {0:?}")]
    InvalidDuration(String),

    /// Tracking store read/write failure
    #[error("tracking store error: {0}")]
    Tracking(String),

    /// Event payload missing or malformed
    #[error("invalid event payload: {0}")]
    Event(String),

    /// Authentication could not be resolved
    #[error("authentication error: {0}")]
    Auth(String),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;
