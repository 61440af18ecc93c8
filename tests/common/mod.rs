//! Shared test helpers

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{MergeResponse, MockPlatformService, PlatformCall};

use bump_merger::event::{PushEvent, parse_payload};
use bump_merger::handler::HandlerOptions;
use bump_merger::types::{
    MergeSettings, MergeableState, PlatformConfig, PrState, PullRequestSnapshot, ReviewEdge,
    ReviewState,
};

pub const BOT: &str = "dependabot[bot]";

pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "octo-org".to_string(),
        repo: "widgets".to_string(),
        api_url: None,
    }
}

pub fn mock() -> MockPlatformService {
    MockPlatformService::with_config(github_config())
}

/// An open, mergeable, unreviewed PR
pub fn make_pr(id: &str, title: &str) -> PullRequestSnapshot {
    PullRequestSnapshot {
        id: id.to_string(),
        mergeable: MergeableState::Mergeable,
        merged: false,
        state: PrState::Open,
        title: title.to_string(),
        review_edges: vec![],
    }
}

pub fn make_review(id: &str, state: ReviewState) -> ReviewEdge {
    ReviewEdge {
        id: id.to_string(),
        state,
        author: Some("octocat".to_string()),
        submitted_at: None,
    }
}

pub fn options(maximum_retries: u32) -> HandlerOptions {
    HandlerOptions {
        expected_actor: BOT.to_string(),
        merge: MergeSettings {
            maximum_retries,
            ..MergeSettings::default()
        },
    }
}

pub fn push_json(pusher: &str, branch: &str, messages: &[&str]) -> String {
    let commits: Vec<_> = messages
        .iter()
        .map(|m| serde_json::json!({ "message": m }))
        .collect();
    serde_json::json!({
        "ref": format!("refs/heads/{branch}"),
        "pusher": { "name": pusher, "email": "bot@example.com" },
        "commits": commits,
        "repository": { "full_name": "octo-org/widgets" }
    })
    .to_string()
}

pub fn push_event(pusher: &str, branch: &str, messages: &[&str]) -> PushEvent {
    parse_payload(&push_json(pusher, branch, messages)).expect("valid push payload")
}
