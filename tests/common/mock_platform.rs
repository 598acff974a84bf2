//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use dependabot_helper::error::{Error, Result};
use dependabot_helper::platform::{IssueQuery, PlatformService};
use dependabot_helper::types::{
    BranchProtection, CheckRun, CheckSuite, CombinedStatus, CommitState, Issue, MergeMethod,
    MergeResult, Owner, PullRequestDetails, Repository, Review,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::time::Instant;

/// Scripted result of one merge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The host merged the PR
    Merged,
    /// The host answered without merging
    NotMerged(String),
    /// The call failed with this HTTP status
    Status(u16),
}

/// Call record for `merge_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCall {
    pub number: u64,
    pub method: MergeMethod,
    pub at: Instant,
}

/// Call record for `enable_auto_merge`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoMergeCall {
    pub node_id: String,
    pub method: MergeMethod,
}

/// Simple mock platform service for testing
///
/// This manually implements `PlatformService` rather than using mockall,
/// so responses and call logs stay plain data.
///
/// Features:
/// - Configurable responses per PR, commit and suite
/// - Call tracking for verification
/// - Error injection as HTTP statuses (classified like real responses)
/// - Per-attempt scripted merge outcomes with call timestamps
pub struct MockPlatformService {
    current_user: Owner,
    organizations: Mutex<Vec<Owner>>,
    repository: Mutex<Repository>,
    repository_lists: Mutex<HashMap<String, Vec<Repository>>>,
    protection: Mutex<Option<BranchProtection>>,
    dependabot_config: AtomicBool,
    issues: Mutex<HashMap<String, Vec<Issue>>>,
    pull_requests: Mutex<HashMap<u64, PullRequestDetails>>,
    statuses: Mutex<HashMap<String, CombinedStatus>>,
    suites: Mutex<HashMap<String, Vec<CheckSuite>>>,
    runs: Mutex<HashMap<u64, Vec<CheckRun>>>,
    reviews: Mutex<HashMap<u64, Vec<Review>>>,
    merge_scripts: Mutex<HashMap<u64, VecDeque<MergeOutcome>>>,
    always_fail_merge: Mutex<HashMap<u64, u16>>,
    // Call tracking
    get_repository_calls: AtomicUsize,
    list_issues_calls: Mutex<Vec<String>>,
    get_pull_request_calls: Mutex<Vec<u64>>,
    protection_calls: AtomicUsize,
    status_calls: AtomicUsize,
    suite_calls: AtomicUsize,
    run_calls: Mutex<Vec<u64>>,
    review_calls: Mutex<Vec<u64>>,
    approve_calls: Mutex<Vec<u64>>,
    merge_calls: Mutex<Vec<MergeCall>>,
    auto_merge_calls: Mutex<Vec<AutoMergeCall>>,
    // Error injection
    error_on_list_issues: Mutex<Option<u16>>,
    error_on_get_pull_request: Mutex<HashMap<u64, u16>>,
    error_on_get_repository: Mutex<Option<u16>>,
    error_on_auto_merge: Mutex<Option<u16>>,
}

impl MockPlatformService {
    /// Create a mock signed in as `login`, serving `repository`
    pub fn new(login: &str, repository: Repository) -> Self {
        Self {
            current_user: super::owner(login),
            organizations: Mutex::new(Vec::new()),
            repository: Mutex::new(repository),
            repository_lists: Mutex::new(HashMap::new()),
            protection: Mutex::new(None),
            dependabot_config: AtomicBool::new(false),
            issues: Mutex::new(HashMap::new()),
            pull_requests: Mutex::new(HashMap::new()),
            statuses: Mutex::new(HashMap::new()),
            suites: Mutex::new(HashMap::new()),
            runs: Mutex::new(HashMap::new()),
            reviews: Mutex::new(HashMap::new()),
            merge_scripts: Mutex::new(HashMap::new()),
            always_fail_merge: Mutex::new(HashMap::new()),
            get_repository_calls: AtomicUsize::new(0),
            list_issues_calls: Mutex::new(Vec::new()),
            get_pull_request_calls: Mutex::new(Vec::new()),
            protection_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            suite_calls: AtomicUsize::new(0),
            run_calls: Mutex::new(Vec::new()),
            review_calls: Mutex::new(Vec::new()),
            approve_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            auto_merge_calls: Mutex::new(Vec::new()),
            error_on_list_issues: Mutex::new(None),
            error_on_get_pull_request: Mutex::new(HashMap::new()),
            error_on_get_repository: Mutex::new(None),
            error_on_auto_merge: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make `list_issues` fail with an HTTP status
    pub fn fail_list_issues(&self, status: u16) {
        *self.error_on_list_issues.lock().unwrap() = Some(status);
    }

    /// Make `get_pull_request` fail for one PR
    pub fn fail_get_pull_request(&self, number: u64, status: u16) {
        self.error_on_get_pull_request
            .lock()
            .unwrap()
            .insert(number, status);
    }

    /// Make `get_repository` fail with an HTTP status
    pub fn fail_get_repository(&self, status: u16) {
        *self.error_on_get_repository.lock().unwrap() = Some(status);
    }

    /// Make `enable_auto_merge` fail with an HTTP status
    pub fn fail_auto_merge(&self, status: u16) {
        *self.error_on_auto_merge.lock().unwrap() = Some(status);
    }

    /// Make every merge attempt for a PR fail with an HTTP status
    pub fn fail_merge_always(&self, number: u64, status: u16) {
        self.always_fail_merge
            .lock()
            .unwrap()
            .insert(number, status);
    }

    // === Response setup ===

    /// Script merge outcomes for a PR, one per attempt; afterwards it merges
    pub fn script_merges(&self, number: u64, outcomes: Vec<MergeOutcome>) {
        self.merge_scripts
            .lock()
            .unwrap()
            .insert(number, outcomes.into());
    }

    /// Add an open PR, listed as an issue created by `creator`
    pub fn add_pull_request(&self, creator: &str, details: PullRequestDetails) {
        self.issues
            .lock()
            .unwrap()
            .entry(creator.to_string())
            .or_default()
            .push(Issue {
                number: details.number,
                title: details.title.clone(),
                is_pull_request: true,
            });
        self.pull_requests
            .lock()
            .unwrap()
            .insert(details.number, details);
    }

    /// Add a plain issue (not a PR) for `creator`
    pub fn add_issue(&self, creator: &str, number: u64) {
        self.issues
            .lock()
            .unwrap()
            .entry(creator.to_string())
            .or_default()
            .push(Issue {
                number,
                title: format!("Issue {number}"),
                is_pull_request: false,
            });
    }

    /// Set the branch protection of every branch
    pub fn set_protection(&self, protection: Option<BranchProtection>) {
        *self.protection.lock().unwrap() = protection;
    }

    /// Set the combined status for a commit
    pub fn set_combined_status(&self, sha: &str, status: CombinedStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(sha.to_string(), status);
    }

    /// Set the check suites for a commit
    pub fn set_suites(&self, sha: &str, suites: Vec<CheckSuite>) {
        self.suites.lock().unwrap().insert(sha.to_string(), suites);
    }

    /// Set the check runs for a suite
    pub fn set_runs(&self, suite_id: u64, runs: Vec<CheckRun>) {
        self.runs.lock().unwrap().insert(suite_id, runs);
    }

    /// Set the reviews for a PR
    pub fn set_reviews(&self, number: u64, reviews: Vec<Review>) {
        self.reviews.lock().unwrap().insert(number, reviews);
    }

    /// Set the organizations of the current user
    pub fn set_organizations(&self, orgs: Vec<Owner>) {
        *self.organizations.lock().unwrap() = orgs;
    }

    /// Set a repository list; key is `self`, `org:<login>` or `user:<login>`
    pub fn set_repository_list(&self, key: &str, repos: Vec<Repository>) {
        self.repository_lists
            .lock()
            .unwrap()
            .insert(key.to_string(), repos);
    }

    /// Report a Dependabot config file
    pub fn set_dependabot_config(&self, present: bool) {
        self.dependabot_config.store(present, Ordering::SeqCst);
    }

    // === Call inspection ===

    pub fn get_repository_count(&self) -> usize {
        self.get_repository_calls.load(Ordering::SeqCst)
    }

    pub fn list_issues_calls(&self) -> Vec<String> {
        self.list_issues_calls.lock().unwrap().clone()
    }

    pub fn get_pull_request_calls(&self) -> Vec<u64> {
        self.get_pull_request_calls.lock().unwrap().clone()
    }

    pub fn protection_count(&self) -> usize {
        self.protection_calls.load(Ordering::SeqCst)
    }

    pub fn status_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn suite_count(&self) -> usize {
        self.suite_calls.load(Ordering::SeqCst)
    }

    pub fn run_calls(&self) -> Vec<u64> {
        self.run_calls.lock().unwrap().clone()
    }

    pub fn review_calls(&self) -> Vec<u64> {
        self.review_calls.lock().unwrap().clone()
    }

    pub fn approve_calls(&self) -> Vec<u64> {
        self.approve_calls.lock().unwrap().clone()
    }

    pub fn merge_calls(&self) -> Vec<MergeCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    /// PR numbers of merge attempts, in call order
    pub fn merge_attempts(&self) -> Vec<u64> {
        self.merge_calls().iter().map(|c| c.number).collect()
    }

    pub fn auto_merge_calls(&self) -> Vec<AutoMergeCall> {
        self.auto_merge_calls.lock().unwrap().clone()
    }
}

fn injected(status: u16) -> Error {
    Error::from_status(status, "injected failure")
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_user(&self, login: &str) -> Result<Owner> {
        Ok(super::owner(login))
    }

    async fn get_current_user(&self) -> Result<Owner> {
        Ok(self.current_user.clone())
    }

    async fn get_organizations_for_current_user(&self) -> Result<Vec<Owner>> {
        Ok(self.organizations.lock().unwrap().clone())
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository> {
        self.get_repository_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.error_on_get_repository.lock().unwrap() {
            return Err(injected(status));
        }
        let repo = self.repository.lock().unwrap().clone();
        if repo.owner == owner && repo.name == name {
            Ok(repo)
        } else {
            Err(Error::NotFound(format!("{owner}/{name}")))
        }
    }

    async fn list_repositories_for_org(&self, owner: &str) -> Result<Vec<Repository>> {
        Ok(self
            .repository_lists
            .lock()
            .unwrap()
            .get(&format!("org:{owner}"))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_repositories_for_user(&self, owner: &str) -> Result<Vec<Repository>> {
        Ok(self
            .repository_lists
            .lock()
            .unwrap()
            .get(&format!("user:{owner}"))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_repositories_for_current_user(&self) -> Result<Vec<Repository>> {
        Ok(self
            .repository_lists
            .lock()
            .unwrap()
            .get("self")
            .cloned()
            .unwrap_or_default())
    }

    async fn get_branch_protection(
        &self,
        _owner: &str,
        _name: &str,
        _branch: &str,
    ) -> Result<Option<BranchProtection>> {
        self.protection_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.protection.lock().unwrap().clone())
    }

    async fn has_dependabot_config(&self, _owner: &str, _name: &str) -> Result<bool> {
        Ok(self.dependabot_config.load(Ordering::SeqCst))
    }

    async fn list_issues(
        &self,
        _owner: &str,
        _name: &str,
        query: &IssueQuery<'_>,
    ) -> Result<Vec<Issue>> {
        self.list_issues_calls
            .lock()
            .unwrap()
            .push(query.creator.to_string());
        if let Some(status) = *self.error_on_list_issues.lock().unwrap() {
            return Err(injected(status));
        }
        Ok(self
            .issues
            .lock()
            .unwrap()
            .get(query.creator)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_pull_request(
        &self,
        _owner: &str,
        _name: &str,
        number: u64,
    ) -> Result<PullRequestDetails> {
        self.get_pull_request_calls.lock().unwrap().push(number);
        if let Some(status) = self.error_on_get_pull_request.lock().unwrap().get(&number) {
            return Err(injected(*status));
        }
        self.pull_requests
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("PR #{number}")))
    }

    async fn get_combined_commit_status(
        &self,
        _owner: &str,
        _name: &str,
        sha: &str,
    ) -> Result<CombinedStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or(CombinedStatus {
                state: CommitState::Pending,
                total_count: 0,
                statuses: Vec::new(),
            }))
    }

    async fn list_check_suites_for_ref(
        &self,
        _owner: &str,
        _name: &str,
        sha: &str,
    ) -> Result<Vec<CheckSuite>> {
        self.suite_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .suites
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_check_runs_for_suite(
        &self,
        _owner: &str,
        _name: &str,
        suite_id: u64,
    ) -> Result<Vec<CheckRun>> {
        self.run_calls.lock().unwrap().push(suite_id);
        Ok(self
            .runs
            .lock()
            .unwrap()
            .get(&suite_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_reviews(&self, _owner: &str, _name: &str, number: u64) -> Result<Vec<Review>> {
        self.review_calls.lock().unwrap().push(number);
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .unwrap_or_default())
    }

    async fn approve(&self, _owner: &str, _name: &str, number: u64) -> Result<()> {
        self.approve_calls.lock().unwrap().push(number);
        Ok(())
    }

    async fn merge_pull_request(
        &self,
        _owner: &str,
        _name: &str,
        number: u64,
        method: MergeMethod,
    ) -> Result<MergeResult> {
        self.merge_calls.lock().unwrap().push(MergeCall {
            number,
            method,
            at: Instant::now(),
        });

        if let Some(status) = self.always_fail_merge.lock().unwrap().get(&number) {
            return Err(injected(*status));
        }

        let outcome = self
            .merge_scripts
            .lock()
            .unwrap()
            .get_mut(&number)
            .and_then(VecDeque::pop_front)
            .unwrap_or(MergeOutcome::Merged);

        match outcome {
            MergeOutcome::Merged => Ok(MergeResult {
                merged: true,
                sha: Some(format!("merged_sha_{number}")),
                message: None,
            }),
            MergeOutcome::NotMerged(message) => Ok(MergeResult {
                merged: false,
                sha: None,
                message: Some(message),
            }),
            MergeOutcome::Status(status) => Err(injected(status)),
        }
    }

    async fn enable_auto_merge(&self, node_id: &str, method: MergeMethod) -> Result<()> {
        self.auto_merge_calls.lock().unwrap().push(AutoMergeCall {
            node_id: node_id.to_string(),
            method,
        });
        if let Some(status) = *self.error_on_auto_merge.lock().unwrap() {
            return Err(injected(status));
        }
        Ok(())
    }
}
