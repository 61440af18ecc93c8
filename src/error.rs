//! Error types for bump-merger

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end a push invocation
#[derive(Debug, Error)]
pub enum Error {
    /// The push payload does not have the expected shape
    #[error("malformed push payload: {0}")]
    MalformedPayload(String),

    /// Transport or API failure talking to GitHub
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Merge mutation rejected for a transient reason (safe to retry after refresh)
    #[error("merge rejected (retryable): {0}")]
    RetryableMerge(String),

    /// Merge mutation rejected for a reason a retry will not fix
    #[error("merge rejected: {0}")]
    NonRetryableMerge(String),

    /// Merge executor gave up
    #[error(transparent)]
    Merge(#[from] MergeFailure),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether a failed merge mutation may succeed on a later attempt
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RetryableMerge(_))
    }
}

/// Terminal failure of the merge executor
///
/// Distinguishes budget exhaustion from an outright rejection so the log
/// line says which one happened.
#[derive(Debug, Error)]
pub enum MergeFailure {
    /// Every attempt failed with a retryable cause
    #[error("merge gave up after {attempts} attempt(s): {reason}")]
    RetriesExhausted {
        /// Number of mutations issued
        attempts: u32,
        /// Last failure reported by the platform
        reason: String,
    },

    /// A non-retryable cause stopped the executor
    #[error("merge rejected on attempt {attempt}: {reason}")]
    Rejected {
        /// Attempt that was rejected (1-based)
        attempt: u32,
        /// Failure reported by the platform
        reason: String,
    },

    /// The refreshed pull request can no longer be merged
    #[error("pull request no longer eligible after attempt {attempt}: {reason}")]
    NoLongerEligible {
        /// Attempt that preceded the refresh (1-based)
        attempt: u32,
        /// What the refresh showed
        reason: String,
    },

    /// Re-fetching the pull request between attempts failed
    #[error("failed to refresh pull request after attempt {attempt}: {reason}")]
    RefreshFailed {
        /// Attempt that preceded the refresh (1-based)
        attempt: u32,
        /// Why the refresh failed
        reason: String,
    },
}

impl MergeFailure {
    /// Number of merge mutations issued before the executor stopped
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::RetriesExhausted { attempts, .. } => *attempts,
            Self::Rejected { attempt, .. }
            | Self::NoLongerEligible { attempt, .. }
            | Self::RefreshFailed { attempt, .. } => *attempt,
        }
    }
}
