//! Merge execution - effectful operations
//!
//! Issues the merge mutation and retries retryable failures. Before every
//! retry the PR is fetched again, since a stale review edge is one of the
//! usual reasons the mutation fails.

use crate::error::MergeFailure;
use crate::platform::PlatformService;
use crate::types::{MergeAttempt, MergeableState, PrState, PullRequestSnapshot};
use tracing::{info, warn};

/// Result of a successful merge execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeExecutionResult {
    /// Number of merge mutations issued
    pub attempts: u32,
    /// The refresh found the PR already merged, by someone else or by an
    /// attempt whose response was lost
    pub merged_elsewhere: bool,
}

/// Merge with bounded retry (EFFECTFUL)
///
/// Runs `Attempting(1)` through `Attempting(maximum_retries)`:
/// - success ends the loop
/// - a retryable failure below the ceiling waits `retry_delay`, refreshes the
///   PR and tries again
/// - a retryable failure at the ceiling, or any other failure, is terminal
/// - a refresh that returns a different PR, a closed PR or a conflicting PR
///   is terminal; only the latest review edge is carried into the next attempt
///
/// At most `maximum_retries` mutations are issued.
pub async fn merge_with_retry(
    platform: &dyn PlatformService,
    mut attempt: MergeAttempt,
) -> Result<MergeExecutionResult, MergeFailure> {
    let maximum = attempt.maximum_retries.max(1);
    attempt.retry_count = attempt.retry_count.clamp(1, maximum);

    loop {
        let n = attempt.retry_count;
        info!(
            attempt = n,
            maximum,
            pull_request_id = %attempt.pull_request_id,
            "attempting merge"
        );

        let err = match platform.merge_pull_request(&attempt).await {
            Ok(()) => {
                info!(attempt = n, "merged pull request");
                return Ok(MergeExecutionResult {
                    attempts: n,
                    merged_elsewhere: false,
                });
            }
            Err(e) => e,
        };

        if !err.is_retryable() {
            warn!(attempt = n, error = %err, "merge failed, not retrying");
            return Err(MergeFailure::Rejected {
                attempt: n,
                reason: err.to_string(),
            });
        }

        if n >= maximum {
            warn!(attempt = n, error = %err, "merge failed, retries exhausted");
            return Err(MergeFailure::RetriesExhausted {
                attempts: n,
                reason: err.to_string(),
            });
        }

        warn!(attempt = n, error = %err, "merge failed, refreshing before retry");
        if !attempt.retry_delay.is_zero() {
            tokio::time::sleep(attempt.retry_delay).await;
        }

        let refreshed = match platform.find_pull_request(&attempt.head_ref).await {
            Ok(Some(pr)) => pr,
            Ok(None) => {
                return Err(MergeFailure::RefreshFailed {
                    attempt: n,
                    reason: format!("no pull request found for branch {}", attempt.head_ref),
                });
            }
            Err(e) => {
                return Err(MergeFailure::RefreshFailed {
                    attempt: n,
                    reason: e.to_string(),
                });
            }
        };

        if refreshed.id != attempt.pull_request_id {
            return Err(MergeFailure::RefreshFailed {
                attempt: n,
                reason: format!(
                    "branch {} now resolves to pull request {} instead of {}",
                    attempt.head_ref, refreshed.id, attempt.pull_request_id
                ),
            });
        }

        if refreshed.merged {
            info!(attempt = n, "pull request was merged while retrying");
            return Ok(MergeExecutionResult {
                attempts: n,
                merged_elsewhere: true,
            });
        }

        if let Some(reason) = no_longer_mergeable(&refreshed) {
            warn!(attempt = n, %reason, "pull request no longer eligible, not retrying");
            return Err(MergeFailure::NoLongerEligible { attempt: n, reason });
        }

        attempt.review_edge = refreshed.latest_review().cloned();
        attempt.retry_count = n + 1;
    }
}

/// Platform state that rules out another attempt
///
/// `UNKNOWN` mergeability is not terminal: GitHub recomputes it after the
/// base branch moves, and the next mutation reports the outcome.
fn no_longer_mergeable(pr: &PullRequestSnapshot) -> Option<String> {
    if pr.state != PrState::Open {
        return Some(format!("not open: {}", pr.state));
    }
    if pr.mergeable == MergeableState::Conflicting {
        return Some(format!("not mergeable: {}", pr.mergeable));
    }
    None
}
