use chrono::{DateTime, Duration, Utc};

use crate::github::PullRequest;

/// Parse the `/stale` argument. Only a plain non-negative day count is
/// accepted; surrounding whitespace is ignored.
pub fn parse_days(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok()
}

/// Instant before which a pull request counts as stale. `None` when the
/// day count reaches past the earliest representable date.
pub fn cutoff(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(Duration::try_days(i64::from(days))?)
}

/// Keep pull requests created strictly before `cutoff`.
pub fn older_than(pulls: Vec<PullRequest>, cutoff: DateTime<Utc>) -> Vec<PullRequest> {
    pulls.into_iter().filter(|pr| pr.created_at < cutoff).collect()
}
