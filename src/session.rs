//! Platform access scoped to one signed-in user.
//!
//! `UserSession` puts the caching policy in front of [`PlatformService`]:
//!
//! | lookup                              | lifetime |
//! |-------------------------------------|----------|
//! | user, organizations, repositories   | long     |
//! | branch protection, dependabot config| long     |
//! | combined status, suites, runs       | short    |
//! | issues, pull requests, reviews      | never    |
//!
//! Issues, pull requests and reviews must reflect just-made changes
//! (approvals, merges), so they always go to the platform.

use crate::cache::{Cache, Lifetime};
use crate::error::Result;
use crate::platform::{IssueQuery, PlatformService};
use crate::types::{
    BranchProtection, CheckRun, CheckSuite, CombinedStatus, Issue, MergeMethod, MergeResult,
    Owner, PullRequestDetails, Repository, Review,
};
use std::sync::Arc;
use tracing::debug;

/// Cached platform access for one user
#[derive(Clone)]
pub struct UserSession {
    platform: Arc<dyn PlatformService>,
    cache: Cache,
    login: String,
}

impl std::fmt::Debug for UserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSession")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

impl UserSession {
    /// Create a session for a known user login
    pub fn new(platform: Arc<dyn PlatformService>, cache: Cache, login: impl Into<String>) -> Self {
        Self {
            platform,
            cache,
            login: login.into(),
        }
    }

    /// Resolve the authenticated user and create a session for them
    pub async fn sign_in(platform: Arc<dyn PlatformService>, cache: Cache) -> Result<Self> {
        let user = platform.get_current_user().await?;
        debug!(login = %user.login, "signed in");
        Ok(Self::new(platform, cache, user.login))
    }

    /// Login of the session's user (also the cache namespace)
    pub fn login(&self) -> &str {
        &self.login
    }

    /// The uncached platform
    pub fn platform(&self) -> &dyn PlatformService {
        self.platform.as_ref()
    }

    async fn cached<T, F, Fut>(&self, key: &str, lifetime: Lifetime, factory: F) -> Result<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let ttl = self.cache.policy().ttl(lifetime);
        self.cache
            .get_or_compute(&self.login, key, ttl, factory)
            .await
    }

    // =========================================================================
    // Long lifetime
    // =========================================================================

    /// Look up a user or organization
    pub async fn user(&self, login: &str) -> Result<Owner> {
        self.cached(&format!("user:{login}"), Lifetime::Long, || {
            self.platform.get_user(login)
        })
        .await
    }

    /// Organizations of the session's user
    pub async fn organizations(&self) -> Result<Vec<Owner>> {
        self.cached("orgs", Lifetime::Long, || {
            self.platform.get_organizations_for_current_user()
        })
        .await
    }

    /// One repository
    pub async fn repository(&self, owner: &str, name: &str) -> Result<Repository> {
        self.cached(&format!("repo:{owner}/{name}"), Lifetime::Long, || {
            self.platform.get_repository(owner, name)
        })
        .await
    }

    /// Repositories owned by the session's user
    pub async fn own_repositories(&self) -> Result<Vec<Repository>> {
        self.cached("repos:self", Lifetime::Long, || {
            self.platform.list_repositories_for_current_user()
        })
        .await
    }

    /// Repositories of an organization
    pub async fn org_repositories(&self, owner: &str) -> Result<Vec<Repository>> {
        self.cached(&format!("repos:org:{owner}"), Lifetime::Long, || {
            self.platform.list_repositories_for_org(owner)
        })
        .await
    }

    /// Public repositories of another user
    pub async fn user_repositories(&self, owner: &str) -> Result<Vec<Repository>> {
        self.cached(&format!("repos:user:{owner}"), Lifetime::Long, || {
            self.platform.list_repositories_for_user(owner)
        })
        .await
    }

    /// Branch protection; `None` when the branch is unprotected
    pub async fn branch_protection(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>> {
        self.cached(
            &format!("protection:{owner}/{name}:{branch}"),
            Lifetime::Long,
            || self.platform.get_branch_protection(owner, name, branch),
        )
        .await
    }

    /// Whether the repository has a Dependabot config file
    pub async fn has_dependabot_config(&self, owner: &str, name: &str) -> Result<bool> {
        self.cached(&format!("dependabot:{owner}/{name}"), Lifetime::Long, || {
            self.platform.has_dependabot_config(owner, name)
        })
        .await
    }

    // =========================================================================
    // Short lifetime
    // =========================================================================

    /// Combined commit status
    pub async fn combined_status(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> Result<CombinedStatus> {
        self.cached(&format!("status:{owner}/{name}:{sha}"), Lifetime::Short, || {
            self.platform.get_combined_commit_status(owner, name, sha)
        })
        .await
    }

    /// Check suites of a commit
    pub async fn check_suites(&self, owner: &str, name: &str, sha: &str) -> Result<Vec<CheckSuite>> {
        self.cached(&format!("suites:{owner}/{name}:{sha}"), Lifetime::Short, || {
            self.platform.list_check_suites_for_ref(owner, name, sha)
        })
        .await
    }

    /// Check runs of a suite
    pub async fn check_runs(&self, owner: &str, name: &str, suite_id: u64) -> Result<Vec<CheckRun>> {
        self.cached(&format!("runs:{owner}/{name}:{suite_id}"), Lifetime::Short, || {
            self.platform.list_check_runs_for_suite(owner, name, suite_id)
        })
        .await
    }

    // =========================================================================
    // Never cached
    // =========================================================================

    /// Open bot issues
    pub async fn issues(&self, owner: &str, name: &str, query: &IssueQuery<'_>) -> Result<Vec<Issue>> {
        self.platform.list_issues(owner, name, query).await
    }

    /// Full PR details
    pub async fn pull_request(&self, owner: &str, name: &str, number: u64) -> Result<PullRequestDetails> {
        self.platform.get_pull_request(owner, name, number).await
    }

    /// Reviews of a PR
    pub async fn reviews(&self, owner: &str, name: &str, number: u64) -> Result<Vec<Review>> {
        self.platform.list_reviews(owner, name, number).await
    }

    /// Submit an approving review
    pub async fn approve(&self, owner: &str, name: &str, number: u64) -> Result<()> {
        self.platform.approve(owner, name, number).await
    }

    /// Merge a PR
    pub async fn merge(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        method: MergeMethod,
    ) -> Result<MergeResult> {
        self.platform
            .merge_pull_request(owner, name, number, method)
            .await
    }

    /// Enable auto-merge for a PR
    pub async fn enable_auto_merge(&self, node_id: &str, method: MergeMethod) -> Result<()> {
        self.platform.enable_auto_merge(node_id, method).await
    }
}
