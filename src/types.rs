//! Core types for dependabot-helper

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A GitHub user or organization account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Owner {
    /// Account login
    pub login: String,
    /// Display name, if set
    pub name: Option<String>,
    /// Avatar image URL
    pub avatar_url: String,
    /// Profile URL
    pub html_url: String,
    /// Whether the account is a bot (e.g. `dependabot[bot]`)
    pub is_bot: bool,
}

/// Repository visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Visible to everyone
    Public,
    /// Visible to collaborators only
    Private,
    /// Visible to enterprise members
    Internal,
}

/// A repository, as seen by the merge core (never mutated)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Repository {
    /// Numeric repository ID
    pub id: u64,
    /// Repository owner login
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Web URL
    pub html_url: String,
    /// Whether the repository is a fork
    pub is_fork: bool,
    /// Repository visibility
    pub visibility: Visibility,
    /// Merge commits permitted
    pub allow_merge_commit: bool,
    /// Rebase merges permitted
    pub allow_rebase_merge: bool,
    /// Squash merges permitted
    pub allow_squash_merge: bool,
}

impl Repository {
    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Whether the repository permits the given merge method
    pub const fn allows(&self, method: MergeMethod) -> bool {
        match method {
            MergeMethod::Merge => self.allow_merge_commit,
            MergeMethod::Rebase => self.allow_rebase_merge,
            MergeMethod::Squash => self.allow_squash_merge,
        }
    }
}

/// An open issue returned by the issue search; may be a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue/PR number
    pub number: u64,
    /// Title
    pub title: String,
    /// Whether the issue is backed by a pull request
    pub is_pull_request: bool,
}

/// Full pull request details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestDetails {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Web URL for the PR
    pub html_url: String,
    /// Head commit SHA
    pub head_sha: String,
    /// Base branch name
    pub base_ref: String,
    /// GraphQL node ID, used for auto-merge mutations
    pub node_id: Option<String>,
    /// Whether PR is a draft
    pub is_draft: bool,
    /// Whether PR can be merged (no conflicts)
    /// - `Some(true)` = mergeable
    /// - `Some(false)` = definitively unmergeable
    /// - `None` = unknown (GitHub still computing)
    pub mergeable: Option<bool>,
}

/// Tri-state verdict combining statuses and checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChecksStatus {
    /// Still waiting on at least one signal
    #[default]
    Pending,
    /// At least one status or check failed
    Error,
    /// Everything required has passed
    Success,
}

impl std::fmt::Display for ChecksStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Error => write!(f, "error"),
            Self::Success => write!(f, "success"),
        }
    }
}

/// A bot-authored open pull request, evaluated for display or merge.
///
/// Candidates are built in one go by the scanner; re-evaluation produces
/// a new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// PR number
    pub number: u64,
    /// Repository owner
    pub repository_owner: String,
    /// Repository name
    pub repository_name: String,
    /// PR title
    pub title: String,
    /// Web URL for the PR
    pub html_url: String,
    /// Head commit SHA
    pub head_sha: String,
    /// Base branch name
    pub base_ref: String,
    /// GraphQL node ID, used for auto-merge mutations
    pub node_id: Option<String>,
    /// Whether PR is a draft
    pub is_draft: bool,
    /// Raw mergeability flag from the host
    pub mergeable: Option<bool>,
    /// Whether the current user may still approve
    pub can_approve: bool,
    /// Whether enough approvals are present
    pub is_approved: bool,
    /// Combined checks verdict
    pub status: ChecksStatus,
}

impl Candidate {
    /// Build an unevaluated candidate from PR details
    pub fn from_details(owner: &str, name: &str, details: PullRequestDetails) -> Self {
        Self {
            number: details.number,
            repository_owner: owner.to_string(),
            repository_name: name.to_string(),
            title: details.title,
            html_url: details.html_url,
            head_sha: details.head_sha,
            base_ref: details.base_ref,
            node_id: details.node_id,
            is_draft: details.is_draft,
            mergeable: details.mergeable,
            can_approve: false,
            is_approved: false,
            status: ChecksStatus::Pending,
        }
    }

    /// Return a copy carrying the given evaluation results
    #[must_use]
    pub fn evaluated(self, approval: Approval, status: ChecksStatus) -> Self {
        Self {
            can_approve: approval.can_approve,
            is_approved: approval.is_approved,
            status,
            ..self
        }
    }
}

/// Approval evaluation result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approval {
    /// Current user has no surviving review yet
    pub can_approve: bool,
    /// Approvals meet the required count and nobody requested changes
    pub is_approved: bool,
}

/// Branch protection snapshot for one branch
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchProtection {
    /// Required approving review count, if configured
    pub required_approving_review_count: Option<u32>,
    /// Required status check context names
    pub required_status_checks: BTreeSet<String>,
}

impl BranchProtection {
    /// Required reviewer count, with a floor of one reviewer
    pub fn required_reviewers(&self) -> u32 {
        self.required_approving_review_count.unwrap_or(1).max(1)
    }
}

/// Combined state of the legacy commit status API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitState {
    /// Some statuses still pending
    Pending,
    /// All statuses succeeded
    Success,
    /// A status failed
    Failure,
    /// A status errored
    Error,
}

/// A single commit status context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Context name
    pub context: String,
    /// State of this context
    pub state: CommitState,
}

/// Combined commit status for a ref
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedStatus {
    /// Combined state across all contexts
    pub state: CommitState,
    /// Number of statuses
    pub total_count: u64,
    /// Individual statuses
    pub statuses: Vec<CommitStatus>,
}

/// Progress of a check suite or check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// Queued, requested, waiting or pending
    Queued,
    /// Currently running
    InProgress,
    /// Finished
    Completed,
}

impl CheckStatus {
    /// Parse GitHub's status string
    pub fn from_api(value: &str) -> Self {
        match value {
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::Queued,
        }
    }
}

/// Conclusion of a finished check suite or run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckConclusion {
    /// Action required by a user
    ActionRequired,
    /// Cancelled
    Cancelled,
    /// Failed
    Failure,
    /// Neutral
    Neutral,
    /// Skipped
    Skipped,
    /// Stale (superseded)
    Stale,
    /// Passed
    Success,
    /// Timed out
    TimedOut,
}

impl CheckConclusion {
    /// Parse GitHub's conclusion string
    pub fn from_api(value: &str) -> Option<Self> {
        match value {
            "action_required" => Some(Self::ActionRequired),
            "cancelled" => Some(Self::Cancelled),
            "failure" => Some(Self::Failure),
            "neutral" => Some(Self::Neutral),
            "skipped" => Some(Self::Skipped),
            "stale" => Some(Self::Stale),
            "success" => Some(Self::Success),
            "timed_out" => Some(Self::TimedOut),
            _ => None,
        }
    }
}

/// A check suite registered by one CI application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSuite {
    /// Suite ID
    pub id: u64,
    /// Progress
    pub status: CheckStatus,
    /// Conclusion once completed
    pub conclusion: Option<CheckConclusion>,
}

/// A check run inside a suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRun {
    /// Check name (matches required status check contexts)
    pub name: String,
    /// Progress
    pub status: CheckStatus,
    /// Conclusion once completed
    pub conclusion: Option<CheckConclusion>,
}

/// Review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewState {
    /// Approved
    Approved,
    /// Changes requested
    ChangesRequested,
    /// Commented only
    Commented,
    /// Dismissed
    Dismissed,
    /// Pending (not submitted)
    Pending,
}

/// Reviewer's association with the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorAssociation {
    /// Collaborator
    Collaborator,
    /// Organization member
    Member,
    /// Repository owner
    Owner,
    /// Anything else (contributor, first-timer, none)
    Other,
}

impl AuthorAssociation {
    /// Parse GitHub's association string
    pub fn from_api(value: &str) -> Self {
        match value {
            "COLLABORATOR" => Self::Collaborator,
            "MEMBER" => Self::Member,
            "OWNER" => Self::Owner,
            _ => Self::Other,
        }
    }

    /// Whether reviews from this association count towards approval
    pub const fn can_review(self) -> bool {
        matches!(self, Self::Collaborator | Self::Member | Self::Owner)
    }
}

/// A submitted review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Reviewer login
    pub reviewer: String,
    /// Whether the reviewer is a bot account
    pub reviewer_is_bot: bool,
    /// Reviewer's association with the repository
    pub author_association: AuthorAssociation,
    /// Review state
    pub state: ReviewState,
    /// Submission time
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Result of a merge call
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Create a merge commit
    Merge,
    /// Rebase commits onto base branch
    Rebase,
    /// Squash all commits into one
    Squash,
}

impl MergeMethod {
    /// Fixed fallback order appended to every preference list
    pub const FALLBACK_ORDER: [Self; 3] = [Self::Merge, Self::Rebase, Self::Squash];
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

impl std::str::FromStr for MergeMethod {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "rebase" => Ok(Self::Rebase),
            "squash" => Ok(Self::Squash),
            other => Err(crate::error::Error::Config(format!(
                "unknown merge method '{other}'"
            ))),
        }
    }
}

/// Outcome of merging all eligible pull requests in one repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// PRs merged, in attempt order
    pub merged: Vec<u64>,
    /// PRs that could not be merged but had auto-merge enabled
    pub auto_merge_enabled: Vec<u64>,
    /// PRs that failed, with the error message
    pub failed: Vec<(u64, String)>,
    /// Whether the run stopped early because it was cancelled
    pub cancelled: bool,
}

impl MergeReport {
    /// Check if at least some merges succeeded
    #[must_use]
    pub const fn has_merges(&self) -> bool {
        !self.merged.is_empty()
    }
}
