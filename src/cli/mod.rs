//! Command-line interface
//!
//! Every option falls back to the environment variable a GitHub Actions
//! workflow provides, so the binary normally runs with no arguments.

mod context;

use anyhow::Context as _;
use bump_merger::event::{parse_payload, parse_push_event};
use bump_merger::handler::{HandlerOptions, PushOutcome, handle_push, ignored_actor};
use bump_merger::policy::{AllowAll, MergePolicy, SemverBumpPolicy, VersionBump};
use bump_merger::types::{MergeMethod, MergeSettings};
use clap::{Parser, ValueEnum};
use context::CommandContext;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Merge dependency bump pull requests when their branch is pushed
#[derive(Debug, Parser)]
#[command(name = "bump-merger", version, about)]
pub struct Cli {
    /// Path to the push event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: PathBuf,

    /// Repository as owner/name (defaults to the payload's repository)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Token used for GitHub API calls
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Login of the account whose pushes are handled
    #[arg(long, env = "GITHUB_LOGIN", default_value = "dependabot[bot]")]
    pub github_login: String,

    /// Maximum number of merge attempts
    #[arg(
        long,
        env = "MAXIMUM_RETRIES",
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub maximum_retries: u32,

    /// Delay between merge attempts, in milliseconds
    #[arg(long, env = "RETRY_DELAY_MS", default_value_t = 0)]
    pub retry_delay_ms: u64,

    /// Merge method
    #[arg(long, env = "MERGE_METHOD", value_enum, default_value_t = MergeMethodArg::Squash)]
    pub merge_method: MergeMethodArg,

    /// Largest version bump merged automatically
    #[arg(long, env = "MAXIMUM_VERSION_BUMP", value_enum, default_value_t = VersionBumpArg::Minor)]
    pub maximum_version_bump: VersionBumpArg,
}

/// Merge method as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MergeMethodArg {
    /// Squash all commits into one
    Squash,
    /// Create a merge commit
    Merge,
    /// Rebase the commits onto the base branch
    Rebase,
}

impl From<MergeMethodArg> for MergeMethod {
    fn from(arg: MergeMethodArg) -> Self {
        match arg {
            MergeMethodArg::Squash => Self::Squash,
            MergeMethodArg::Merge => Self::Merge,
            MergeMethodArg::Rebase => Self::Rebase,
        }
    }
}

/// Largest bump merged without a human
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VersionBumpArg {
    /// Anything, including major bumps
    Major,
    /// Minor and patch bumps
    Minor,
    /// Patch bumps only
    Patch,
}

impl VersionBumpArg {
    fn policy(self) -> Box<dyn MergePolicy> {
        match self {
            Self::Major => Box::new(AllowAll),
            Self::Minor => Box::new(SemverBumpPolicy::new(VersionBump::Minor)),
            Self::Patch => Box::new(SemverBumpPolicy::new(VersionBump::Patch)),
        }
    }
}

/// Handle the push event named on the command line
///
/// The platform service is only built once the push is known to come from
/// the automation account, so ignored pushes need no repository or token.
pub async fn run_push(cli: &Cli) -> anyhow::Result<()> {
    let payload = std::fs::read_to_string(&cli.event_path)
        .with_context(|| format!("failed to read {}", cli.event_path.display()))?;
    let event = parse_payload(&payload)?;

    let options = HandlerOptions {
        expected_actor: cli.github_login.clone(),
        merge: MergeSettings {
            maximum_retries: cli.maximum_retries,
            retry_delay: Duration::from_millis(cli.retry_delay_ms),
            merge_method: cli.merge_method.into(),
        },
    };

    if let Some(outcome) = ignored_actor(&event, &options) {
        report(&outcome);
        return Ok(());
    }

    let details = parse_push_event(&event)?;
    let ctx = CommandContext::new(cli, details.repository.as_deref())?;
    let policy = cli.maximum_version_bump.policy();

    let outcome = handle_push(&event, ctx.platform.as_ref(), policy.as_ref(), &options).await?;
    report(&outcome);
    Ok(())
}

fn report(outcome: &PushOutcome) {
    match outcome {
        PushOutcome::IgnoredActor { pusher } => info!(%pusher, "ignored push"),
        PushOutcome::NoPullRequest { branch } => info!(%branch, "nothing to merge"),
        PushOutcome::Skipped(reason) => info!(%reason, "not merged"),
        PushOutcome::Merged(result) => info!(attempts = result.attempts, "done"),
    }
}
