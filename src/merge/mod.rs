//! Merge-eligibility decision engine
//!
//! Pure pieces (target resolution, activity, policy, approval and CI
//! classification) live in their own modules so they can be tested without
//! I/O. `execute` sequences them against a [`PlatformService`].
//!
//! [`PlatformService`]: crate::platform::PlatformService

mod activity;
mod approvals;
mod ci;
mod discover;
mod execute;
mod policy;
mod targets;

pub use activity::{last_activity, latest_activity};
pub use approvals::{count_approvals, count_qualifying_approvals};
pub use ci::{CiGate, evaluate_check_runs};
pub use discover::discover_pull_requests;
pub use execute::{Decision, MergeEngine};
pub use policy::{EligibilityPolicy, Requirements, is_past_due};
pub use targets::{WatchTarget, resolve_filters};
