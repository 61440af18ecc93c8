//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use bump_merger::error::{Error, Result};
use bump_merger::platform::PlatformService;
use bump_merger::types::{MergeAttempt, PlatformConfig, PullRequestSnapshot};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::Instant;

/// Scripted response for one `merge_pull_request` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeResponse {
    /// Mutation succeeds
    Success,
    /// `Error::RetryableMerge` with the given message
    Retryable(String),
    /// `Error::NonRetryableMerge` with the given message
    NonRetryable(String),
    /// `Error::GitHubApi`, as for a dropped connection
    Transport(String),
}

impl MergeResponse {
    fn into_result(self) -> Result<()> {
        match self {
            Self::Success => Ok(()),
            Self::Retryable(msg) => Err(Error::RetryableMerge(msg)),
            Self::NonRetryable(msg) => Err(Error::NonRetryableMerge(msg)),
            Self::Transport(msg) => Err(Error::GitHubApi(msg)),
        }
    }
}

/// One call to either platform method, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    /// `find_pull_request` for the given head branch
    Find(String),
    /// `merge_pull_request` with the attempt as passed in
    Merge(MergeAttempt),
}

/// Simple mock platform service for testing
///
/// Features:
/// - Per-branch queues of snapshots (the last one repeats)
/// - Scripted merge responses (success once the script runs out)
/// - Ordered call log for verification, with the (tokio) time of each call
/// - Error injection for the query
pub struct MockPlatformService {
    config: PlatformConfig,
    find_responses: Mutex<HashMap<String, VecDeque<Option<PullRequestSnapshot>>>>,
    merge_responses: Mutex<VecDeque<MergeResponse>>,
    calls: Mutex<Vec<(Instant, PlatformCall)>>,
    error_on_find: Mutex<Option<String>>,
    config_reads: AtomicUsize,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            find_responses: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            error_on_find: Mutex::new(None),
            config_reads: AtomicUsize::new(0),
        }
    }

    // === Setup ===

    /// Queue a `find_pull_request` response for a branch
    pub fn push_find_response(&self, branch: &str, pr: Option<PullRequestSnapshot>) {
        self.find_responses
            .lock()
            .unwrap()
            .entry(branch.to_string())
            .or_default()
            .push_back(pr);
    }

    /// Queue merge responses, consumed one per call
    pub fn script_merges(&self, responses: impl IntoIterator<Item = MergeResponse>) {
        self.merge_responses.lock().unwrap().extend(responses);
    }

    /// Make `find_pull_request` return a transport error
    pub fn fail_find(&self, msg: &str) {
        *self.error_on_find.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification ===

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// When each call was made, in call order
    pub fn call_instants(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }

    pub fn find_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::Find(branch) => Some(branch),
                PlatformCall::Merge(_) => None,
            })
            .collect()
    }

    pub fn merge_calls(&self) -> Vec<MergeAttempt> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::Merge(attempt) => Some(attempt),
                PlatformCall::Find(_) => None,
            })
            .collect()
    }

    /// How many times `config()` was read
    pub fn config_reads(&self) -> usize {
        self.config_reads.load(Ordering::SeqCst)
    }

    pub fn merge_call_count(&self) -> usize {
        self.merge_calls().len()
    }

    pub fn assert_no_calls(&self) {
        let calls = self.calls();
        assert!(calls.is_empty(), "Expected no platform calls but got: {calls:?}");
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn find_pull_request(&self, head_branch: &str) -> Result<Option<PullRequestSnapshot>> {
        self.record(PlatformCall::Find(head_branch.to_string()));

        if let Some(msg) = self.error_on_find.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let mut responses = self.find_responses.lock().unwrap();
        let Some(queue) = responses.get_mut(head_branch) else {
            return Ok(None);
        };
        if queue.len() > 1 {
            Ok(queue.pop_front().flatten())
        } else {
            Ok(queue.front().cloned().flatten())
        }
    }

    async fn merge_pull_request(&self, attempt: &MergeAttempt) -> Result<()> {
        self.record(PlatformCall::Merge(attempt.clone()));

        self.merge_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MergeResponse::Success)
            .into_result()
    }

    fn config(&self) -> &PlatformConfig {
        self.config_reads.fetch_add(1, Ordering::SeqCst);
        &self.config
    }
}
