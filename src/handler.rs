//! Push handler - coordinates one push event end to end

use crate::error::Result;
use crate::event::{PushEvent, parse_push_event};
use crate::merge::{MergeExecutionResult, SkipReason, first_failing_rule, merge_with_retry};
use crate::platform::PlatformService;
use crate::policy::MergePolicy;
use crate::types::{MergeAttempt, MergeSettings};
use tracing::{info, instrument, warn};

/// Options for the push handler
#[derive(Debug, Clone)]
pub struct HandlerOptions {
    /// Login of the automation account whose pushes are handled
    pub expected_actor: String,
    /// Retry and merge-method settings for the executor
    pub merge: MergeSettings,
}

/// How a push invocation ended without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Pushed by someone other than the automation account
    IgnoredActor {
        /// Who pushed
        pusher: String,
    },
    /// No pull request is associated with the pushed branch
    NoPullRequest {
        /// Pushed branch
        branch: String,
    },
    /// Evaluation declined to merge
    Skipped(SkipReason),
    /// The pull request was merged
    Merged(MergeExecutionResult),
}

/// Check the pusher against the automation account (no network)
///
/// Returns `Some(IgnoredActor)` when the push should be left alone. Callers
/// can run this before building a platform service at all.
pub fn ignored_actor(event: &PushEvent, options: &HandlerOptions) -> Option<PushOutcome> {
    if event.pusher.name == options.expected_actor {
        return None;
    }
    info!(
        pusher = %event.pusher.name,
        expected = %options.expected_actor,
        "push was not made by the automation account, nothing to do"
    );
    Some(PushOutcome::IgnoredActor {
        pusher: event.pusher.name.clone(),
    })
}

/// Handle one push event
///
/// Skips and ignored pushes are `Ok`. Payload, transport and merge
/// failures are returned as errors.
#[instrument(skip_all, fields(pusher = %event.pusher.name, git_ref = %event.git_ref))]
pub async fn handle_push(
    event: &PushEvent,
    platform: &dyn PlatformService,
    policy: &dyn MergePolicy,
    options: &HandlerOptions,
) -> Result<PushOutcome> {
    if let Some(outcome) = ignored_actor(event, options) {
        return Ok(outcome);
    }

    let details = parse_push_event(event)?;
    let config = platform.config();
    info!(
        owner = %config.owner,
        repo = %config.repo,
        branch = %details.branch,
        headline = %details.commit_headline,
        "handling push"
    );

    let Some(pr) = platform.find_pull_request(&details.branch).await? else {
        warn!(branch = %details.branch, "no pull request found for branch");
        return Ok(PushOutcome::NoPullRequest {
            branch: details.branch,
        });
    };

    if let Some((rule, reason)) = first_failing_rule(&pr, policy) {
        info!(
            pull_request_id = %pr.id,
            title = %pr.title,
            rule = rule.name,
            %reason,
            "skipping merge"
        );
        return Ok(PushOutcome::Skipped(reason));
    }

    let attempt = MergeAttempt::first(
        &pr,
        &details.branch,
        &details.commit_headline,
        &options.merge,
    );
    match merge_with_retry(platform, attempt).await {
        Ok(result) => {
            info!(
                pull_request_id = %pr.id,
                attempts = result.attempts,
                "pull request merged"
            );
            Ok(PushOutcome::Merged(result))
        }
        Err(failure) => {
            warn!(pull_request_id = %pr.id, error = %failure, "failed to merge pull request");
            Err(failure.into())
        }
    }
}
