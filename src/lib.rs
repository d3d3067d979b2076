//! pr-automerge - merges pull requests once they satisfy review, timeout
//! and CI rules.
//!
//! A merge pass discovers open pull requests across the watched
//! repositories and walks each one through a fixed set of gates:
//!
//! 1. still open
//! 2. quiet for longer than the author's tier timeout
//! 3. enough approvals from allowed reviewer roles
//! 4. CI green on the head commit
//!
//! Only then is the merge API called. See [`merge::MergeEngine`].

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod merge;
pub mod platform;
pub mod summary;
pub mod tracking;
pub mod types;

pub use error::{Error, Result};
