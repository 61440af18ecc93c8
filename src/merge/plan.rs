//! Eligibility evaluation - pure functions deciding whether to merge
//!
//! No I/O happens here. The checks are an ordered table so the policy reads
//! top to bottom and each rule can be tested on its own.

use crate::policy::MergePolicy;
use crate::types::{MergeableState, PrState, PullRequestSnapshot};

/// Why a pull request was not merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// GitHub does not report the PR as mergeable
    NotMergeable(MergeableState),
    /// PR is already merged
    AlreadyMerged,
    /// PR is closed (or merged without the flag being set yet)
    NotOpen(PrState),
    /// Title failed the merge policy
    BlockedByPolicy,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotMergeable(state) => write!(f, "not mergeable: {state}"),
            Self::AlreadyMerged => write!(f, "already merged"),
            Self::NotOpen(state) => write!(f, "not open: {state}"),
            Self::BlockedByPolicy => write!(f, "version bump not allowed by policy"),
        }
    }
}

/// Outcome of evaluating a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Do not merge
    Skip(SkipReason),
    /// Go ahead with the merge
    Proceed,
}

/// A named check; returns a reason when it disqualifies the PR
pub struct EligibilityRule {
    /// Short name, logged as `rule` when the check fires
    pub name: &'static str,
    /// The check itself
    pub check: fn(&PullRequestSnapshot, &dyn MergePolicy) -> Option<SkipReason>,
}

/// Checks in evaluation order, first match wins
///
/// Platform-computed disqualifiers come before the policy so no title
/// parsing happens for a PR GitHub has already ruled out.
pub const ELIGIBILITY_RULES: &[EligibilityRule] = &[
    EligibilityRule {
        name: "mergeable",
        check: |pr, _| {
            (pr.mergeable != MergeableState::Mergeable)
                .then_some(SkipReason::NotMergeable(pr.mergeable))
        },
    },
    EligibilityRule {
        name: "not-merged",
        check: |pr, _| pr.merged.then_some(SkipReason::AlreadyMerged),
    },
    EligibilityRule {
        name: "open",
        check: |pr, _| (pr.state != PrState::Open).then_some(SkipReason::NotOpen(pr.state)),
    },
    EligibilityRule {
        name: "policy",
        check: |pr, policy| (!policy.should_merge(&pr.title)).then_some(SkipReason::BlockedByPolicy),
    },
];

/// First rule that disqualifies the snapshot, with its reason (PURE)
#[must_use]
pub fn first_failing_rule(
    snapshot: &PullRequestSnapshot,
    policy: &dyn MergePolicy,
) -> Option<(&'static EligibilityRule, SkipReason)> {
    ELIGIBILITY_RULES
        .iter()
        .find_map(|rule| (rule.check)(snapshot, policy).map(|reason| (rule, reason)))
}

/// Decide whether a snapshot should be merged (PURE)
#[must_use]
pub fn evaluate(snapshot: &PullRequestSnapshot, policy: &dyn MergePolicy) -> Decision {
    first_failing_rule(snapshot, policy).map_or(Decision::Proceed, |(_, reason)| {
        Decision::Skip(reason)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order_is_fixed() {
        let names: Vec<_> = ELIGIBILITY_RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, ["mergeable", "not-merged", "open", "policy"]);
    }

    #[test]
    fn test_failing_rule_is_named() {
        let mut pr = PullRequestSnapshot {
            id: "PR_1".to_string(),
            mergeable: MergeableState::Mergeable,
            merged: true,
            state: PrState::Merged,
            title: "t".to_string(),
            review_edges: vec![],
        };
        let (rule, reason) = first_failing_rule(&pr, &crate::policy::AllowAll).expect("skip");
        assert_eq!(rule.name, "not-merged");
        assert_eq!(reason, SkipReason::AlreadyMerged);

        pr.merged = false;
        pr.state = PrState::Open;
        assert!(first_failing_rule(&pr, &crate::policy::AllowAll).is_none());
    }

    #[test]
    fn test_skip_reason_messages() {
        assert_eq!(
            SkipReason::NotMergeable(MergeableState::Conflicting).to_string(),
            "not mergeable: CONFLICTING"
        );
        assert_eq!(SkipReason::AlreadyMerged.to_string(), "already merged");
        assert_eq!(
            SkipReason::NotOpen(PrState::Closed).to_string(),
            "not open: CLOSED"
        );
        assert_eq!(
            SkipReason::BlockedByPolicy.to_string(),
            "version bump not allowed by policy"
        );
    }
}
