//! Title-based merge policy
//!
//! Dependency bots name their PRs like `Bump serde from 1.0.1 to 1.0.2`.
//! The policy reads the two versions out of the title and only lets the PR
//! through when the bump is no larger than the configured maximum.

use regex::Regex;
use std::sync::LazyLock;

/// Decides from a PR title whether the bot may merge it
pub trait MergePolicy: Send + Sync {
    /// Returns `true` if a PR with this title may be merged
    fn should_merge(&self, title: &str) -> bool;
}

/// Size of a version change
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VersionBump {
    /// Only the patch component changed (or nothing did)
    Patch,
    /// Minor component changed
    Minor,
    /// Major component changed
    Major,
}

impl std::fmt::Display for VersionBump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

static FROM_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfrom\s+v?(\S+)\s+to\s+v?(\S+)").expect("valid from/to regex")
});

/// Accepts bumps up to `maximum`
#[derive(Debug, Clone, Copy)]
pub struct SemverBumpPolicy {
    /// Largest bump that is still merged
    pub maximum: VersionBump,
}

impl SemverBumpPolicy {
    /// Policy allowing bumps up to `maximum`
    #[must_use]
    pub const fn new(maximum: VersionBump) -> Self {
        Self { maximum }
    }
}

impl MergePolicy for SemverBumpPolicy {
    fn should_merge(&self, title: &str) -> bool {
        // Titles without a from/to pair are not version bumps we can rank.
        let Some(captures) = FROM_TO.captures(title) else {
            return true;
        };

        match bump_between(&captures[1], &captures[2]) {
            Some(bump) => bump <= self.maximum,
            None => false,
        }
    }
}

/// Accepts every title
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl MergePolicy for AllowAll {
    fn should_merge(&self, _title: &str) -> bool {
        true
    }
}

/// Classify the change between two dotted versions
///
/// Missing components count as zero, so `1.2` to `1.2.1` is a patch bump.
/// Returns `None` when either side is not a dotted numeric version.
#[must_use]
pub fn bump_between(from: &str, to: &str) -> Option<VersionBump> {
    let from = parse_version(from)?;
    let to = parse_version(to)?;

    Some(if from.0 != to.0 {
        VersionBump::Major
    } else if from.1 != to.1 {
        VersionBump::Minor
    } else {
        VersionBump::Patch
    })
}

fn parse_version(text: &str) -> Option<(u64, u64, u64)> {
    // Pre-release and build suffixes don't affect the bump size.
    let core = text
        .trim_end_matches(['.', ',', ')'])
        .split(['-', '+'])
        .next()?;

    let mut parts = core.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch))
}
