//! Core types for bump-merger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Repository coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom API base URL (None for api.github.com)
    pub api_url: Option<String>,
}

/// Platform-computed mergeability of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeableState {
    /// Can be merged without conflicts
    Mergeable,
    /// Has merge conflicts
    Conflicting,
    /// GitHub has not finished computing mergeability
    Unknown,
}

impl std::fmt::Display for MergeableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mergeable => write!(f, "MERGEABLE"),
            Self::Conflicting => write!(f, "CONFLICTING"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrState {
    /// PR is open and can be merged
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Merged => write!(f, "MERGED"),
        }
    }
}

/// State of a submitted review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    /// Reviewer approved the changes
    Approved,
    /// Reviewer asked for changes
    ChangesRequested,
    /// Review left comments only
    Commented,
    /// Review was dismissed
    Dismissed,
    /// Review started but not submitted
    Pending,
}

/// One recorded review on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEdge {
    /// GraphQL node ID of the review
    pub id: String,
    /// Review state
    pub state: ReviewState,
    /// Login of the reviewer, if the account still exists
    pub author: Option<String>,
    /// When the review was submitted
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Point-in-time view of one pull request
///
/// Never mutated after construction. A merge retry fetches a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSnapshot {
    /// GraphQL node ID, used by the merge mutation
    pub id: String,
    /// Platform-computed mergeability
    pub mergeable: MergeableState,
    /// Whether the PR has been merged
    pub merged: bool,
    /// Current state of the PR
    pub state: PrState,
    /// PR title
    pub title: String,
    /// Reviews in platform order (most recent last)
    pub review_edges: Vec<ReviewEdge>,
}

impl PullRequestSnapshot {
    /// The most recent review, if any
    #[must_use]
    pub fn latest_review(&self) -> Option<&ReviewEdge> {
        self.review_edges.last()
    }
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMethod {
    /// Squash all commits into one
    #[default]
    Squash,
    /// Create a merge commit
    Merge,
    /// Rebase commits onto base branch
    Rebase,
}

impl MergeMethod {
    /// Value of the `PullRequestMergeMethod` GraphQL enum
    #[must_use]
    pub const fn as_graphql(self) -> &'static str {
        match self {
            Self::Squash => "SQUASH",
            Self::Merge => "MERGE",
            Self::Rebase => "REBASE",
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// Input to the merge executor
///
/// Built once per push. The executor owns it and only advances
/// `retry_count` and `review_edge` between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeAttempt {
    /// GraphQL node ID of the PR
    pub pull_request_id: String,
    /// Branch the PR is opened from (used to re-fetch state)
    pub head_ref: String,
    /// Headline used for the merge commit
    pub commit_headline: String,
    /// Current attempt, starting at 1
    pub retry_count: u32,
    /// Attempt ceiling
    pub maximum_retries: u32,
    /// Most recent review, `None` when the PR has no reviews
    pub review_edge: Option<ReviewEdge>,
    /// Merge method passed to the mutation
    pub merge_method: MergeMethod,
    /// Pause between a failed attempt and the refresh that precedes the next one
    pub retry_delay: Duration,
}

impl MergeAttempt {
    /// First attempt for a snapshot that passed evaluation
    #[must_use]
    pub fn first(
        snapshot: &PullRequestSnapshot,
        head_ref: &str,
        commit_headline: &str,
        settings: &MergeSettings,
    ) -> Self {
        Self {
            pull_request_id: snapshot.id.clone(),
            head_ref: head_ref.to_string(),
            commit_headline: commit_headline.to_string(),
            retry_count: 1,
            maximum_retries: settings.maximum_retries,
            review_edge: snapshot.latest_review().cloned(),
            merge_method: settings.merge_method,
            retry_delay: settings.retry_delay,
        }
    }
}

/// Caller-supplied knobs for the merge executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSettings {
    /// Attempt ceiling (at least 1)
    pub maximum_retries: u32,
    /// Delay between attempts
    pub retry_delay: Duration,
    /// Merge method
    pub merge_method: MergeMethod,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            maximum_retries: 3,
            retry_delay: Duration::ZERO,
            merge_method: MergeMethod::Squash,
        }
    }
}
