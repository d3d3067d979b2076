//! TOML file persistence for tracked pull requests.

use super::{PullRequestStore, TRACKING_VERSION, TrackedPullRequest, TrackingState};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Directory name for pr-automerge data within the platform data directory.
const APP_DIR: &str = "pr-automerge";

/// Filename for tracking state.
const TRACKING_FILE: &str = "tracked.toml";

/// Get path to the tracking state file inside `dir`.
pub fn tracking_path(dir: &Path) -> PathBuf {
    dir.join(TRACKING_FILE)
}

/// Default tracking file location (`<data-local-dir>/pr-automerge/tracked.toml`).
pub fn default_tracking_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| tracking_path(&dir.join(APP_DIR)))
}

/// Load tracking state from disk.
///
/// Returns an empty `TrackingState` if the file doesn't exist.
pub fn load_tracking(path: &Path) -> Result<TrackingState> {
    if !path.exists() {
        return Ok(TrackingState::new());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Tracking(format!("failed to read {}: {e}", path.display())))?;

    let state: TrackingState = toml::from_str(&content)
        .map_err(|e| Error::Tracking(format!("failed to parse {}: {e}", path.display())))?;

    Ok(state)
}

/// Save tracking state to disk.
///
/// Creates the parent directory if it doesn't exist.
pub fn save_tracking(path: &Path, state: &TrackingState) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Tracking(format!("failed to create {}: {e}", dir.display())))?;
    }

    let mut state_to_save = state.clone();
    state_to_save.version = TRACKING_VERSION;

    let content = toml::to_string_pretty(&state_to_save)
        .map_err(|e| Error::Tracking(format!("failed to serialize tracking state: {e}")))?;

    let content_with_header = format!(
        "# pr-automerge tracking metadata\n\
         # Auto-generated - manual edits may be overwritten\n\n{content}"
    );

    fs::write(path, content_with_header)
        .map_err(|e| Error::Tracking(format!("failed to write {}: {e}", path.display())))?;

    Ok(())
}

/// [`PullRequestStore`] backed by a single TOML file
///
/// Every operation reloads the file, so several processes sharing a file see
/// each other's writes between operations.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Store backed by `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<T>(&self, f: impl FnOnce(&mut TrackingState) -> T) -> Result<T> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = load_tracking(&self.path)?;
        let result = f(&mut state);
        save_tracking(&self.path, &state)?;
        Ok(result)
    }
}

impl PullRequestStore for FileStore {
    fn get(&self, url: &str) -> Result<Option<TrackedPullRequest>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(load_tracking(&self.path)?.get(url).cloned())
    }

    fn put(&self, record: TrackedPullRequest) -> Result<()> {
        self.update(|state| state.track(record))
    }

    fn delete(&self, url: &str) -> Result<bool> {
        self.update(|state| state.untrack(url))
    }

    fn list(&self) -> Result<Vec<TrackedPullRequest>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(load_tracking(&self.path)?.pull_requests)
    }
}
