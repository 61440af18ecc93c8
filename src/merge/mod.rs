//! Merge engine for bump PRs
//!
//! Two-phase pattern:
//! 1. Evaluate - decide merge or skip from a snapshot (pure, testable)
//! 2. Execute - perform the merge with bounded retry (effectful)

mod execute;
mod plan;

pub use execute::{MergeExecutionResult, merge_with_retry};
pub use plan::{
    Decision, ELIGIBILITY_RULES, EligibilityRule, SkipReason, evaluate, first_failing_rule,
};
