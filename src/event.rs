//! Push event parsing
//!
//! Turns the raw webhook payload GitHub hands to the workflow into the
//! handful of fields the handler needs.

use crate::error::{Error, Result};
use serde::Deserialize;

/// Prefix of a fully-qualified branch reference
const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Subset of the GitHub `push` webhook payload
#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    /// Fully-qualified reference that was pushed (e.g. `refs/heads/main`)
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Actor that performed the push
    pub pusher: Pusher,
    /// Pushed commits, oldest first. Absent on some tag/delete pushes.
    #[serde(default)]
    pub commits: Option<Vec<PushCommit>>,
    /// Repository the push landed in
    #[serde(default)]
    pub repository: Option<PushRepository>,
}

/// The `pusher` object of a push payload
#[derive(Debug, Clone, Deserialize)]
pub struct Pusher {
    /// Login of the account that pushed
    pub name: String,
}

/// One entry of the `commits` list
#[derive(Debug, Clone, Deserialize)]
pub struct PushCommit {
    /// Full commit message, body included
    pub message: String,
}

/// The `repository` object of a push payload
#[derive(Debug, Clone, Deserialize)]
pub struct PushRepository {
    /// `owner/name`
    pub full_name: String,
}

/// Fields extracted from a push event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushDetails {
    /// Login of the account that pushed
    pub pusher: String,
    /// Short branch name (`refs/heads/` stripped)
    pub branch: String,
    /// First line of the head commit message
    pub commit_headline: String,
    /// `owner/name` from the payload, when present
    pub repository: Option<String>,
}

/// Deserialize a push payload from JSON text
pub fn parse_payload(json: &str) -> Result<PushEvent> {
    serde_json::from_str(json).map_err(|e| Error::MalformedPayload(e.to_string()))
}

/// Extract branch, headline and pusher from a push event
pub fn parse_push_event(event: &PushEvent) -> Result<PushDetails> {
    let branch = parse_branch_name(&event.git_ref)?;
    let commit_headline = parse_commit_headline(event.commits.as_deref())?;

    Ok(PushDetails {
        pusher: event.pusher.name.clone(),
        branch: branch.to_string(),
        commit_headline: commit_headline.to_string(),
        repository: event.repository.as_ref().map(|r| r.full_name.clone()),
    })
}

/// Strip `refs/heads/` from a fully-qualified reference
pub fn parse_branch_name(git_ref: &str) -> Result<&str> {
    match git_ref.strip_prefix(BRANCH_REF_PREFIX) {
        Some(branch) if !branch.is_empty() => Ok(branch),
        _ => Err(Error::MalformedPayload(format!(
            "reference '{git_ref}' is not a branch"
        ))),
    }
}

/// Headline of the head (last) commit in the push
pub fn parse_commit_headline(commits: Option<&[PushCommit]>) -> Result<&str> {
    let commits =
        commits.ok_or_else(|| Error::MalformedPayload("missing commit list".to_string()))?;
    let head = commits
        .last()
        .ok_or_else(|| Error::MalformedPayload("commit list is empty".to_string()))?;

    Ok(headline(&head.message))
}

/// First line of a commit message
#[must_use]
pub fn headline(message: &str) -> &str {
    let line = message.split('\n').next().unwrap_or_default();
    line.strip_suffix('\r').unwrap_or(line)
}
