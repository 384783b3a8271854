use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Pull request state filter accepted by the pulls listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullState {
    Open,
    Closed,
    All,
}

impl PullState {
    pub fn as_str(self) -> &'static str {
        match self {
            PullState::Open => "open",
            PullState::Closed => "closed",
            PullState::All => "all",
        }
    }
}

/// Sort key for the pulls listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)] // Full set of keys GitHub accepts; commands use `Created` today
pub enum PullSort {
    Created,
    Updated,
    Popularity,
    LongRunning,
}

impl PullSort {
    pub fn as_str(self) -> &'static str {
        match self {
            PullSort::Created => "created",
            PullSort::Updated => "updated",
            PullSort::Popularity => "popularity",
            PullSort::LongRunning => "long-running",
        }
    }
}

/// Query for listing pull requests. GitHub caps a page at 100 entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPulls {
    pub state: PullState,
    pub per_page: Option<u8>,
    pub sort: Option<PullSort>,
}

impl ListPulls {
    pub fn open() -> Self {
        Self {
            state: PullState::Open,
            per_page: None,
            sort: None,
        }
    }
}

/// A pull request as listed by the hosting API.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
    pub state: PullState,
    /// Opener's login; absent for deleted accounts
    pub author: Option<String>,
}

/// A submitted review on a pull request.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub pull_number: u64,
    pub reviewer: String,
    /// Pending reviews carry no submission time
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Entry from the commit listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub sha: String,
    pub html_url: String,
    pub author: Option<String>,
}

/// Latest commit on a named branch.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchHead {
    /// GitHub login, or the git author name when the commit email is not
    /// linked to an account
    pub author_login: String,
    pub author_avatar_url: Option<String>,
    pub commit_html_url: String,
}
