//! Platform service for GitHub
//!
//! Abstracts the repository-hosting operations the merge core depends on,
//! so scanning, evaluation and merging can run against a mock in tests.

mod detection;
mod github;

pub use detection::parse_repo_slug;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    BranchProtection, CheckRun, CheckSuite, CombinedStatus, Issue, MergeMethod, MergeResult,
    Owner, PullRequestDetails, Repository, Review,
};
use async_trait::async_trait;

/// Filter for listing bot-created issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery<'a> {
    /// Creator login (e.g. `dependabot[bot]`)
    pub creator: &'a str,
    /// Labels every issue must carry
    pub labels: &'a [String],
    /// Issues per page
    pub page_size: u8,
    /// Maximum number of pages to read
    pub page_count: u32,
}

/// Platform service trait for repository-hosting operations
///
/// Every method is a single remote call (or a paginated sequence of them).
/// Caching is layered on top by [`crate::session::UserSession`].
#[async_trait]
pub trait PlatformService: Send + Sync {
    // =========================================================================
    // Users and repositories
    // =========================================================================

    /// Look up a user or organization by login
    async fn get_user(&self, login: &str) -> Result<Owner>;

    /// The authenticated user
    async fn get_current_user(&self) -> Result<Owner>;

    /// Organizations the authenticated user belongs to
    async fn get_organizations_for_current_user(&self) -> Result<Vec<Owner>>;

    /// Get one repository
    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository>;

    /// Repositories of an organization
    async fn list_repositories_for_org(&self, owner: &str) -> Result<Vec<Repository>>;

    /// Public repositories of another user
    async fn list_repositories_for_user(&self, owner: &str) -> Result<Vec<Repository>>;

    /// Repositories owned by the authenticated user
    async fn list_repositories_for_current_user(&self) -> Result<Vec<Repository>>;

    /// Branch protection for a branch; `None` when no protection is configured
    async fn get_branch_protection(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>>;

    /// Whether the repository has a Dependabot configuration file
    async fn has_dependabot_config(&self, owner: &str, name: &str) -> Result<bool>;

    // =========================================================================
    // Pull requests
    // =========================================================================

    /// Open issues created by a login, filtered by labels
    async fn list_issues(&self, owner: &str, name: &str, query: &IssueQuery<'_>)
    -> Result<Vec<Issue>>;

    /// Get full PR details including mergeability
    async fn get_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
    ) -> Result<PullRequestDetails>;

    // =========================================================================
    // Statuses and checks
    // =========================================================================

    /// Combined legacy commit status for a commit
    async fn get_combined_commit_status(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> Result<CombinedStatus>;

    /// Check suites registered for a commit
    async fn list_check_suites_for_ref(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> Result<Vec<CheckSuite>>;

    /// Check runs belonging to a suite
    async fn list_check_runs_for_suite(
        &self,
        owner: &str,
        name: &str,
        suite_id: u64,
    ) -> Result<Vec<CheckRun>>;

    // =========================================================================
    // Reviews and merging
    // =========================================================================

    /// All reviews of a PR
    async fn list_reviews(&self, owner: &str, name: &str, number: u64) -> Result<Vec<Review>>;

    /// Submit an approving review
    async fn approve(&self, owner: &str, name: &str, number: u64) -> Result<()>;

    /// Merge a PR with the specified method
    ///
    /// Fails with [`crate::error::Error::NotMergeable`] when GitHub refuses
    /// the merge because the PR is not (yet) mergeable.
    async fn merge_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        method: MergeMethod,
    ) -> Result<MergeResult>;

    /// Enable auto-merge so GitHub merges the PR once it becomes mergeable
    async fn enable_auto_merge(&self, node_id: &str, method: MergeMethod) -> Result<()>;
}
