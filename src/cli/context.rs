//! Platform setup for the push command

use super::Cli;
use bump_merger::error::{Error, Result};
use bump_merger::platform::{GitHubService, PlatformService, parse_repository};

/// Everything the push command needs to reach GitHub
///
/// Only built for pushes by the automation account.
pub struct CommandContext {
    /// Platform service (GitHub)
    pub platform: Box<dyn PlatformService>,
}

impl CommandContext {
    /// Resolve the repository and create the platform service
    ///
    /// The `--repository` option wins; otherwise the repository extracted
    /// from the payload is used.
    pub fn new(cli: &Cli, payload_repository: Option<&str>) -> Result<Self> {
        let full_name = cli
            .repository
            .as_deref()
            .or(payload_repository)
            .ok_or_else(|| {
                Error::Config("no repository given and none in the payload".to_string())
            })?;

        let token = cli
            .token
            .as_deref()
            .ok_or_else(|| Error::Config("no token given (set GITHUB_TOKEN)".to_string()))?;

        let config = parse_repository(full_name, cli.api_url.clone())?;
        let platform = GitHubService::new(token, config)?;

        Ok(Self {
            platform: Box::new(platform),
        })
    }
}
