//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    MergeAttempt, MergeableState, PlatformConfig, PrState, PullRequestSnapshot, ReviewEdge,
    ReviewState,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::Deserialize;
use tracing::debug;

/// How many of the most recent reviews the query returns
const REVIEW_WINDOW: u32 = 5;

/// Mutation failures GitHub reports for conditions that clear up on their own
/// or after the PR state is re-read. Matched case-insensitively.
const RETRYABLE_MERGE_ERRORS: &[&str] = &[
    "base branch was modified",
    "head branch was modified",
    "pull request is not mergeable",
    "review and try the merge again",
];

const PULL_REQUEST_QUERY: &str = r"
    query PullRequestForBranch(
        $referenceName: String!
        $repositoryOwner: String!
        $repositoryName: String!
        $reviewWindow: Int!
    ) {
        repository(owner: $repositoryOwner, name: $repositoryName) {
            pullRequests(headRefName: $referenceName, first: 1) {
                nodes {
                    id
                    mergeable
                    merged
                    state
                    title
                    reviews(last: $reviewWindow) {
                        edges {
                            node {
                                id
                                state
                                submittedAt
                                author { login }
                            }
                        }
                    }
                }
            }
        }
    }
";

const MERGE_MUTATION: &str = r"
    mutation MergePullRequest(
        $pullRequestId: ID!
        $commitHeadline: String!
        $mergeMethod: PullRequestMergeMethod!
    ) {
        mergePullRequest(input: {
            pullRequestId: $pullRequestId
            commitHeadline: $commitHeadline
            mergeMethod: $mergeMethod
        }) {
            clientMutationId
        }
    }
";

const APPROVE_AND_MERGE_MUTATION: &str = r"
    mutation ApproveAndMergePullRequest(
        $pullRequestId: ID!
        $commitHeadline: String!
        $mergeMethod: PullRequestMergeMethod!
    ) {
        addPullRequestReview(input: { pullRequestId: $pullRequestId, event: APPROVE }) {
            clientMutationId
        }
        mergePullRequest(input: {
            pullRequestId: $pullRequestId
            commitHeadline: $commitHeadline
            mergeMethod: $mergeMethod
        }) {
            clientMutationId
        }
    }
";

// GraphQL response types

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

impl<T> GraphQlResponse<T> {
    /// Joined error messages, if GitHub reported any
    fn error_message(&self) -> Option<String> {
        let errors = self.errors.as_ref().filter(|e| !e.is_empty())?;
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        Some(messages.join(", "))
    }
}

#[derive(Deserialize)]
struct RepositoryData {
    repository: Option<GraphQlRepository>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRepository {
    pull_requests: Connection<GraphQlPullRequest>,
}

#[derive(Deserialize)]
struct Connection<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct EdgeConnection<T> {
    edges: Vec<Edge<T>>,
}

#[derive(Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Deserialize)]
struct GraphQlPullRequest {
    id: String,
    mergeable: MergeableState,
    merged: bool,
    state: PrState,
    title: String,
    reviews: EdgeConnection<GraphQlReview>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlReview {
    id: String,
    state: ReviewState,
    submitted_at: Option<DateTime<Utc>>,
    author: Option<GraphQlActor>,
}

#[derive(Deserialize)]
struct GraphQlActor {
    login: String,
}

impl From<GraphQlPullRequest> for PullRequestSnapshot {
    fn from(pr: GraphQlPullRequest) -> Self {
        Self {
            id: pr.id,
            mergeable: pr.mergeable,
            merged: pr.merged,
            state: pr.state,
            title: pr.title,
            review_edges: pr
                .reviews
                .edges
                .into_iter()
                .map(|edge| ReviewEdge {
                    id: edge.node.id,
                    state: edge.node.state,
                    author: edge.node.author.map(|a| a.login),
                    submitted_at: edge.node.submitted_at,
                })
                .collect(),
        }
    }
}

/// Sort a mutation failure message into retryable or not
pub(crate) fn classify_merge_error(message: String) -> Error {
    let lowered = message.to_lowercase();
    if RETRYABLE_MERGE_ERRORS.iter().any(|m| lowered.contains(m)) {
        Error::RetryableMerge(message)
    } else {
        Error::NonRetryableMerge(message)
    }
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, config: PlatformConfig) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(ref url) = config.api_url {
            builder = builder
                .base_uri(url.as_str())
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn find_pull_request(&self, head_branch: &str) -> Result<Option<PullRequestSnapshot>> {
        debug!(head_branch, "finding pull request");

        let response: GraphQlResponse<RepositoryData> = self
            .client
            .graphql(&serde_json::json!({
                "query": PULL_REQUEST_QUERY,
                "variables": {
                    "referenceName": head_branch,
                    "repositoryOwner": self.config.owner,
                    "repositoryName": self.config.repo,
                    "reviewWindow": REVIEW_WINDOW,
                }
            }))
            .await
            .map_err(|e| Error::GitHubApi(format!("GraphQL query failed: {e}")))?;

        if let Some(message) = response.error_message() {
            return Err(Error::GitHubApi(format!("GraphQL error: {message}")));
        }

        let repository = response
            .data
            .and_then(|d| d.repository)
            .ok_or_else(|| Error::GitHubApi("No repository in GraphQL response".to_string()))?;

        let result = repository
            .pull_requests
            .nodes
            .into_iter()
            .next()
            .map(PullRequestSnapshot::from);

        if let Some(ref pr) = result {
            debug!(
                id = %pr.id,
                mergeable = %pr.mergeable,
                state = %pr.state,
                reviews = pr.review_edges.len(),
                "found pull request"
            );
        } else {
            debug!(head_branch, "no pull request found");
        }
        Ok(result)
    }

    async fn merge_pull_request(&self, attempt: &MergeAttempt) -> Result<()> {
        // A PR nobody has reviewed yet gets approved in the same request.
        let query = if attempt.review_edge.is_none() {
            APPROVE_AND_MERGE_MUTATION
        } else {
            MERGE_MUTATION
        };

        debug!(
            pull_request_id = %attempt.pull_request_id,
            attempt = attempt.retry_count,
            method = %attempt.merge_method,
            approve = attempt.review_edge.is_none(),
            "merging pull request"
        );

        let response: GraphQlResponse<serde_json::Value> = self
            .client
            .graphql(&serde_json::json!({
                "query": query,
                "variables": {
                    "pullRequestId": attempt.pull_request_id,
                    "commitHeadline": attempt.commit_headline,
                    "mergeMethod": attempt.merge_method.as_graphql(),
                }
            }))
            .await
            .map_err(|e| Error::GitHubApi(format!("GraphQL mutation failed: {e}")))?;

        if let Some(message) = response.error_message() {
            return Err(classify_merge_error(message));
        }

        debug!(pull_request_id = %attempt.pull_request_id, "merge complete");
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
