use std::collections::BTreeMap;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::github::{GitHubApi, GitHubError, PullRequest, Review};

/// Number of reviewers shown on the leaderboard.
pub const TOP_REVIEWERS: usize = 8;

/// Review counts keyed by reviewer login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewerTally {
    counts: BTreeMap<String, u32>,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerCount {
    pub login: String,
    pub reviews: u32,
}

impl ReviewerTally {
    pub fn from_reviews<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Self {
        let mut tally = Self::default();
        for review in reviews {
            tally.record(&review.reviewer);
        }
        tally
    }

    pub fn record(&mut self, login: &str) {
        *self.counts.entry(login.to_string()).or_insert(0) += 1;
    }

    #[cfg(test)]
    pub fn count(&self, login: &str) -> u32 {
        self.counts.get(login).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Reviewers by descending count, at most `limit` of them. Equal counts
    /// are ordered by login.
    pub fn ranked(&self, limit: usize) -> Vec<ReviewerCount> {
        // BTreeMap iterates by login and the sort is stable, so ties stay in
        // login order.
        let mut rows: Vec<ReviewerCount> = self
            .counts
            .iter()
            .map(|(login, reviews)| ReviewerCount {
                login: login.clone(),
                reviews: *reviews,
            })
            .collect();
        rows.sort_by(|a, b| b.reviews.cmp(&a.reviews));
        rows.truncate(limit);
        rows
    }
}

impl ReviewerCount {
    pub fn noun(&self) -> &'static str {
        if self.reviews == 1 {
            "review"
        } else {
            "reviews"
        }
    }

    /// Slack mrkdwn line for this row.
    pub fn line(&self) -> String {
        format!(
            ":github-review: *{}* with {} {}.",
            self.login,
            self.reviews,
            self.noun()
        )
    }
}

/// Fetch the reviews of every pull request, keeping at most `concurrency`
/// requests in flight. The first failed request fails the whole batch.
pub async fn fetch_reviews(
    api: &dyn GitHubApi,
    pulls: &[PullRequest],
    concurrency: usize,
) -> Result<Vec<Review>, GitHubError> {
    let numbers: Vec<u64> = pulls.iter().map(|pr| pr.number).collect();
    let batches: Vec<Vec<Review>> = stream::iter(numbers)
        .map(|number| api.pull_reviews(number))
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    let reviews: Vec<Review> = batches.into_iter().flatten().collect();
    let pending = reviews.iter().filter(|r| r.submitted_at.is_none()).count();
    debug!(pulls = pulls.len(), reviews = reviews.len(), pending, "fetched reviews");
    Ok(reviews)
}
