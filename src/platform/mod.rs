//! Platform service for GitHub
//!
//! The handler only talks to the hosting platform through this trait, so the
//! decision logic can be driven by a mock in tests.

mod detection;
mod github;

pub use detection::parse_repository;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{MergeAttempt, PlatformConfig, PullRequestSnapshot};
use async_trait::async_trait;

/// Platform service trait for the query and the merge mutation
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Find the pull request whose head is `head_branch`, with its reviews
    ///
    /// Returns `Ok(None)` when no pull request is associated with the branch.
    /// Transport failures are returned as errors and are not retried.
    async fn find_pull_request(&self, head_branch: &str) -> Result<Option<PullRequestSnapshot>>;

    /// Issue the merge mutation for one attempt
    ///
    /// Failures must be classified: [`Error::RetryableMerge`] for causes a
    /// refresh-and-retry can fix, [`Error::NonRetryableMerge`] or a transport
    /// error for everything else.
    ///
    /// [`Error::RetryableMerge`]: crate::error::Error::RetryableMerge
    /// [`Error::NonRetryableMerge`]: crate::error::Error::NonRetryableMerge
    async fn merge_pull_request(&self, attempt: &MergeAttempt) -> Result<()>;

    /// Repository this service acts on
    fn config(&self) -> &PlatformConfig;
}
