//! Repository coordinate parsing

use crate::error::{Error, Result};
use crate::types::PlatformConfig;

/// Parse `owner/name` (the `GITHUB_REPOSITORY` format) into a config
pub fn parse_repository(full_name: &str, api_url: Option<String>) -> Result<PlatformConfig> {
    let trimmed = full_name.trim().trim_end_matches('/');
    let (owner, repo) = trimmed
        .split_once('/')
        .ok_or_else(|| Error::Config(format!("repository '{full_name}' is not owner/name")))?;

    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(Error::Config(format!(
            "repository '{full_name}' is not owner/name"
        )));
    }

    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        api_url,
    })
}
