//! Pure transforms from fetched pull request and review data into the
//! numbers the commands report.

pub mod age;
pub mod leaderboard;
pub mod severity;
pub mod stale;

pub use leaderboard::{fetch_reviews, ReviewerTally, TOP_REVIEWERS};
pub use severity::severity_message;

#[cfg(test)]
pub(crate) mod tests {
    use crate::github::{PullRequest, PullState, Review};
    use chrono::{DateTime, TimeZone, Utc};

    /// Minimal open pull request created at `created_at`.
    pub fn pull_created(number: u64, created_at: DateTime<Utc>) -> PullRequest {
        PullRequest {
            id: 1_000 + number,
            number,
            title: format!("PR {number}"),
            created_at,
            html_url: format!("https://github.com/cerbyinc/platform/pull/{number}"),
            state: PullState::Open,
            author: Some("testuser".to_string()),
        }
    }

    pub fn pull_numbered(number: u64) -> PullRequest {
        pull_created(number, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    }

    pub fn review_by(pull_number: u64, login: &str) -> Review {
        Review {
            pull_number,
            reviewer: login.to_string(),
            submitted_at: None,
        }
    }
}
