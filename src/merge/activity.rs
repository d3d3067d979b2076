//! Last activity of a pull request, from its issue timeline

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{PullRequestRef, TimelineEvent};
use chrono::{DateTime, Utc};
use tracing::debug;

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Most recent parseable timestamp across every event and timestamp field.
///
/// Unparseable values are skipped, never read as the epoch. Returns `None`
/// when no event carries a usable timestamp.
pub fn latest_activity(events: &[TimelineEvent]) -> Option<DateTime<Utc>> {
    events
        .iter()
        .flat_map(|e| [&e.created_at, &e.updated_at, &e.timestamp, &e.commented_at])
        .filter_map(|field| field.as_deref().and_then(parse_timestamp))
        .max()
}

/// Fetch the timeline and compute the last activity
pub async fn last_activity(
    platform: &dyn PlatformService,
    pr: &PullRequestRef,
) -> Result<Option<DateTime<Utc>>> {
    let events = platform.list_timeline_events(pr).await?;
    let latest = latest_activity(&events);
    debug!(%pr, events = events.len(), last_activity = ?latest, "computed last activity");
    Ok(latest)
}
