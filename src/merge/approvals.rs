//! Approval counting

use crate::merge::policy::EligibilityPolicy;
use crate::platform::PlatformService;
use crate::types::{PullRequestRef, Review};
use tracing::{debug, error};

/// Count approving reviews from allow-listed associations
pub fn count_qualifying_approvals(reviews: &[Review], policy: &EligibilityPolicy) -> u32 {
    let count = reviews
        .iter()
        .filter(|r| r.state.eq_ignore_ascii_case("APPROVED"))
        .filter(|r| policy.is_allowed(&r.author_association))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Fetch reviews and count the qualifying approvals.
///
/// A failed fetch counts as zero approvals, so it can never cause a merge.
pub async fn count_approvals(
    platform: &dyn PlatformService,
    pr: &PullRequestRef,
    policy: &EligibilityPolicy,
) -> u32 {
    match platform.list_reviews(pr).await {
        Ok(reviews) => {
            let count = count_qualifying_approvals(&reviews, policy);
            debug!(%pr, reviews = reviews.len(), approvals = count, "counted approvals");
            count
        }
        Err(e) => {
            error!(%pr, error = %e, "failed to list reviews, counting no approvals");
            0
        }
    }
}
