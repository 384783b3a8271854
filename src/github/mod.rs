pub mod types;

pub use types::{BranchHead, Commit, ListPulls, PullRequest, PullSort, PullState, Review};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::GitHubConfig;

/// GitHub never returns more than this many entries per page.
pub const MAX_PER_PAGE: u8 = 100;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Read-only view of one repository on the hosting service.
///
/// Every failure collapses into [`GitHubError`]; callers do not distinguish
/// not-found from rate limiting or transport problems.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn list_pull_requests(&self, query: &ListPulls) -> Result<Vec<PullRequest>, GitHubError>;

    async fn list_commits(&self, per_page: u8) -> Result<Vec<Commit>, GitHubError>;

    async fn branch_head(&self, branch: &str) -> Result<BranchHead, GitHubError>;

    async fn pull_reviews(&self, pull_number: u64) -> Result<Vec<Review>, GitHubError>;
}

/// [`GitHubApi`] backed by the GitHub REST API.
pub struct RestClient {
    http: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    token: String,
}

#[derive(Deserialize)]
struct User {
    login: String,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Deserialize)]
struct PullResponse {
    id: u64,
    number: u64,
    title: String,
    created_at: DateTime<Utc>,
    html_url: String,
    state: PullState,
    user: Option<User>,
}

#[derive(Deserialize)]
struct GitAuthor {
    name: String,
}

#[derive(Deserialize)]
struct GitCommit {
    author: Option<GitAuthor>,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    html_url: String,
    author: Option<User>,
    commit: GitCommit,
}

#[derive(Deserialize)]
struct BranchResponse {
    commit: CommitResponse,
}

#[derive(Deserialize)]
struct ReviewResponse {
    user: Option<User>,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
}

impl RestClient {
    pub fn new(config: &GitHubConfig, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: token.to_string(),
        }
    }

    fn repo_url(&self, rest: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, rest
        )
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, GitHubError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .header("User-Agent", "pr-police")
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GitHubApi for RestClient {
    #[instrument(skip(self), fields(owner = %self.owner, repo = %self.repo))]
    async fn list_pull_requests(&self, query: &ListPulls) -> Result<Vec<PullRequest>, GitHubError> {
        let mut params = vec![("state", query.state.as_str().to_string())];
        if let Some(per_page) = query.per_page {
            params.push(("per_page", per_page.min(MAX_PER_PAGE).to_string()));
        }
        if let Some(sort) = query.sort {
            params.push(("sort", sort.as_str().to_string()));
        }

        let pulls: Vec<PullResponse> = self.get(&self.repo_url("pulls"), &params).await?;
        debug!(count = pulls.len(), "received pull requests");

        Ok(pulls
            .into_iter()
            .map(|p| PullRequest {
                id: p.id,
                number: p.number,
                title: p.title,
                created_at: p.created_at,
                html_url: p.html_url,
                state: p.state,
                author: p.user.map(|u| u.login),
            })
            .collect())
    }

    #[instrument(skip(self), fields(owner = %self.owner, repo = %self.repo))]
    async fn list_commits(&self, per_page: u8) -> Result<Vec<Commit>, GitHubError> {
        let params = [("per_page", per_page.min(MAX_PER_PAGE).to_string())];
        let commits: Vec<CommitResponse> = self.get(&self.repo_url("commits"), &params).await?;
        debug!(count = commits.len(), "received commits");

        Ok(commits
            .into_iter()
            .map(|c| Commit {
                sha: c.sha,
                html_url: c.html_url,
                author: c.author.map(|u| u.login),
            })
            .collect())
    }

    #[instrument(skip(self), fields(owner = %self.owner, repo = %self.repo))]
    async fn branch_head(&self, branch: &str) -> Result<BranchHead, GitHubError> {
        let url = self.repo_url(&format!("branches/{branch}"));
        let response: BranchResponse = self.get(&url, &[]).await?;
        let commit = response.commit;

        let (author_login, author_avatar_url) = match commit.author {
            Some(user) => (user.login, user.avatar_url),
            None => (
                commit
                    .commit
                    .author
                    .map(|a| a.name)
                    .unwrap_or_else(|| "unknown".to_string()),
                None,
            ),
        };
        debug!(author = %author_login, sha = %commit.sha, "received branch head");

        Ok(BranchHead {
            author_login,
            author_avatar_url,
            commit_html_url: commit.html_url,
        })
    }

    #[instrument(skip(self), fields(owner = %self.owner, repo = %self.repo))]
    async fn pull_reviews(&self, pull_number: u64) -> Result<Vec<Review>, GitHubError> {
        let url = self.repo_url(&format!("pulls/{pull_number}/reviews"));
        let reviews: Vec<ReviewResponse> = self.get(&url, &[]).await?;
        debug!(count = reviews.len(), "received reviews");

        // Reviews left by since-deleted accounts have no user to credit
        Ok(reviews
            .into_iter()
            .filter_map(|r| {
                r.user.map(|user| Review {
                    pull_number,
                    reviewer: user.login,
                    submitted_at: r.submitted_at,
                })
            })
            .collect())
    }
}
