//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::{IssueQuery, PlatformService};
use crate::types::{
    AuthorAssociation, BranchProtection, CheckConclusion, CheckRun, CheckStatus, CheckSuite,
    CombinedStatus, CommitState, CommitStatus, Issue, MergeMethod, MergeResult, Owner,
    PullRequestDetails, Repository, Review, ReviewState, Visibility,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use tracing::debug;

/// Page size for repository, review and check listings
const LIST_PAGE_SIZE: u8 = 100;

/// Upper bound on pages read for repository, review and check listings
const LIST_MAX_PAGES: u32 = 10;

/// Dependabot configuration file locations, checked in order
const DEPENDABOT_CONFIG_PATHS: [&str; 2] = [".github/dependabot.yml", ".github/dependabot.yaml"];

const ENABLE_AUTO_MERGE_MUTATION: &str = r"
    mutation EnableAutoMerge($pullRequestId: ID!, $mergeMethod: PullRequestMergeMethod!) {
        enablePullRequestAutoMerge(input: { pullRequestId: $pullRequestId, mergeMethod: $mergeMethod }) {
            pullRequest {
                number
            }
        }
    }
";

// GraphQL response types for the auto-merge mutation

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

// REST response types

#[derive(Deserialize)]
struct ApiUser {
    login: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_url: String,
    #[serde(default)]
    html_url: String,
    #[serde(rename = "type", default)]
    kind: String,
}

impl From<ApiUser> for Owner {
    fn from(user: ApiUser) -> Self {
        Self {
            is_bot: user.kind == "Bot",
            login: user.login,
            name: user.name,
            avatar_url: user.avatar_url,
            html_url: user.html_url,
        }
    }
}

#[derive(Deserialize)]
struct ApiRepository {
    id: u64,
    name: String,
    owner: ApiUser,
    html_url: String,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    private: bool,
    visibility: Option<String>,
    // Listing endpoints omit these; GitHub's defaults allow all three
    allow_merge_commit: Option<bool>,
    allow_rebase_merge: Option<bool>,
    allow_squash_merge: Option<bool>,
}

impl From<ApiRepository> for Repository {
    fn from(repo: ApiRepository) -> Self {
        let visibility = match repo.visibility.as_deref() {
            Some("internal") => Visibility::Internal,
            Some("private") => Visibility::Private,
            Some(_) => Visibility::Public,
            None if repo.private => Visibility::Private,
            None => Visibility::Public,
        };
        Self {
            id: repo.id,
            owner: repo.owner.login,
            name: repo.name,
            html_url: repo.html_url,
            is_fork: repo.fork,
            visibility,
            allow_merge_commit: repo.allow_merge_commit.unwrap_or(true),
            allow_rebase_merge: repo.allow_rebase_merge.unwrap_or(true),
            allow_squash_merge: repo.allow_squash_merge.unwrap_or(true),
        }
    }
}

#[derive(Deserialize)]
struct ApiIssue {
    number: u64,
    title: String,
    pull_request: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    ref_field: String,
    sha: String,
}

#[derive(Deserialize)]
struct ApiPullRequest {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    html_url: String,
    node_id: Option<String>,
    draft: Option<bool>,
    mergeable: Option<bool>,
    head: ApiRef,
    base: ApiRef,
}

#[derive(Deserialize)]
struct ApiBranchProtection {
    required_pull_request_reviews: Option<ApiRequiredReviews>,
    required_status_checks: Option<ApiRequiredStatusChecks>,
}

#[derive(Deserialize)]
struct ApiRequiredReviews {
    required_approving_review_count: Option<u32>,
}

#[derive(Deserialize)]
struct ApiRequiredStatusChecks {
    #[serde(default)]
    contexts: Vec<String>,
    #[serde(default)]
    checks: Vec<ApiRequiredCheck>,
}

#[derive(Deserialize)]
struct ApiRequiredCheck {
    context: String,
}

#[derive(Deserialize)]
struct ApiCombinedStatus {
    state: String,
    total_count: u64,
    #[serde(default)]
    statuses: Vec<ApiCommitStatus>,
}

#[derive(Deserialize)]
struct ApiCommitStatus {
    context: String,
    state: String,
}

#[derive(Deserialize)]
struct ApiCheckSuites {
    #[serde(default)]
    check_suites: Vec<ApiCheckSuite>,
}

#[derive(Deserialize)]
struct ApiCheckSuite {
    id: u64,
    status: Option<String>,
    conclusion: Option<String>,
}

#[derive(Deserialize)]
struct ApiCheckRuns {
    #[serde(default)]
    check_runs: Vec<ApiCheckRun>,
}

#[derive(Deserialize)]
struct ApiCheckRun {
    name: String,
    status: String,
    conclusion: Option<String>,
}

#[derive(Deserialize)]
struct ApiReview {
    user: Option<ApiUser>,
    state: String,
    #[serde(default)]
    author_association: String,
    submitted_at: Option<DateTime<Utc>>,
}

fn commit_state(value: &str) -> CommitState {
    match value {
        "success" => CommitState::Success,
        "failure" => CommitState::Failure,
        "error" => CommitState::Error,
        _ => CommitState::Pending,
    }
}

fn review_state(value: &str) -> ReviewState {
    match value {
        "APPROVED" => ReviewState::Approved,
        "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
        "DISMISSED" => ReviewState::Dismissed,
        "PENDING" => ReviewState::Pending,
        _ => ReviewState::Commented,
    }
}

const fn graphql_merge_method(method: MergeMethod) -> &'static str {
    match method {
        MergeMethod::Merge => "MERGE",
        MergeMethod::Rebase => "REBASE",
        MergeMethod::Squash => "SQUASH",
    }
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    /// Token for the GraphQL transport (auto-merge)
    token: String,
    /// HTTP client for the GraphQL transport (auto-merge)
    http_client: Client,
    /// GraphQL endpoint URL
    graphql_url: String,
}

impl GitHubService {
    /// Create a new GitHub service for github.com or an Enterprise host
    pub fn new(token: &str, host: Option<&str>) -> Result<Self> {
        match host {
            Some(h) => Self::with_endpoints(
                token,
                &format!("https://{h}/api/v3"),
                &format!("https://{h}/api/graphql"),
            ),
            None => Self::with_endpoints(
                token,
                "https://api.github.com",
                "https://api.github.com/graphql",
            ),
        }
    }

    /// Create a service against explicit REST and GraphQL endpoints
    pub fn with_endpoints(token: &str, api_base: &str, graphql_url: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base)
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("dependabot-helper")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token: token.to_string(),
            http_client,
            graphql_url: graphql_url.to_string(),
        })
    }

    /// GET a REST route, deserializing into `T`
    async fn get_json<T: DeserializeOwned>(
        &self,
        route: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        Ok(self.client.get(route, Some(params)).await?)
    }

    /// GET every page of a list route, stopping at a short page or `max_pages`
    async fn get_pages<T: DeserializeOwned>(
        &self,
        route: &str,
        params: &[(&str, String)],
        per_page: u8,
        max_pages: u32,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();

        for page in 1..=max_pages {
            let mut page_params = params.to_vec();
            page_params.push(("per_page", per_page.to_string()));
            page_params.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(route, &page_params).await?;
            let short_page = batch.len() < usize::from(per_page);
            items.extend(batch);

            if short_page {
                break;
            }
        }

        Ok(items)
    }

    async fn list_repositories(
        &self,
        route: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Repository>> {
        let repos: Vec<ApiRepository> = self
            .get_pages(route, params, LIST_PAGE_SIZE, LIST_MAX_PAGES)
            .await?;
        debug!(route, count = repos.len(), "listed repositories");
        Ok(repos.into_iter().map(Repository::from).collect())
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_user(&self, login: &str) -> Result<Owner> {
        debug!(login, "getting user");
        let user: ApiUser = self.get_json(&format!("/users/{login}"), &[]).await?;
        Ok(user.into())
    }

    async fn get_current_user(&self) -> Result<Owner> {
        debug!("getting current user");
        let user: ApiUser = self.get_json("/user", &[]).await?;
        Ok(user.into())
    }

    async fn get_organizations_for_current_user(&self) -> Result<Vec<Owner>> {
        debug!("listing organizations");
        let orgs: Vec<ApiUser> = self
            .get_pages("/user/orgs", &[], LIST_PAGE_SIZE, LIST_MAX_PAGES)
            .await?;
        Ok(orgs.into_iter().map(Owner::from).collect())
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<Repository> {
        debug!(owner, name, "getting repository");
        let repo: ApiRepository = self
            .get_json(&format!("/repos/{owner}/{name}"), &[])
            .await?;
        Ok(repo.into())
    }

    async fn list_repositories_for_org(&self, owner: &str) -> Result<Vec<Repository>> {
        self.list_repositories(&format!("/orgs/{owner}/repos"), &[])
            .await
    }

    async fn list_repositories_for_user(&self, owner: &str) -> Result<Vec<Repository>> {
        self.list_repositories(&format!("/users/{owner}/repos"), &[])
            .await
    }

    async fn list_repositories_for_current_user(&self) -> Result<Vec<Repository>> {
        self.list_repositories("/user/repos", &[("affiliation", "owner".to_string())])
            .await
    }

    async fn get_branch_protection(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>> {
        debug!(owner, name, branch, "getting branch protection");
        let route = format!("/repos/{owner}/{name}/branches/{branch}/protection");

        let protection: ApiBranchProtection = match self.get_json(&route, &[]).await {
            Ok(protection) => protection,
            Err(e) if e.is_not_found() => {
                debug!(branch, "branch is not protected");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let required_status_checks: BTreeSet<String> = protection
            .required_status_checks
            .map(|checks| {
                checks
                    .contexts
                    .into_iter()
                    .chain(checks.checks.into_iter().map(|c| c.context))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Some(BranchProtection {
            required_approving_review_count: protection
                .required_pull_request_reviews
                .and_then(|r| r.required_approving_review_count),
            required_status_checks,
        }))
    }

    async fn has_dependabot_config(&self, owner: &str, name: &str) -> Result<bool> {
        for path in DEPENDABOT_CONFIG_PATHS {
            let route = format!("/repos/{owner}/{name}/contents/{path}");
            match self.get_json::<serde_json::Value>(&route, &[]).await {
                Ok(_) => return Ok(true),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }

    async fn list_issues(
        &self,
        owner: &str,
        name: &str,
        query: &IssueQuery<'_>,
    ) -> Result<Vec<Issue>> {
        debug!(owner, name, creator = query.creator, "listing issues");
        let mut params = vec![
            ("creator", query.creator.to_string()),
            ("state", "open".to_string()),
        ];
        if !query.labels.is_empty() {
            params.push(("labels", query.labels.join(",")));
        }

        let issues: Vec<ApiIssue> = self
            .get_pages(
                &format!("/repos/{owner}/{name}/issues"),
                &params,
                query.page_size,
                query.page_count,
            )
            .await?;

        debug!(owner, name, count = issues.len(), "listed issues");
        Ok(issues
            .into_iter()
            .map(|issue| Issue {
                number: issue.number,
                title: issue.title,
                is_pull_request: issue.pull_request.is_some(),
            })
            .collect())
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
    ) -> Result<PullRequestDetails> {
        debug!(owner, name, number, "getting PR");
        let pr: ApiPullRequest = self
            .get_json(&format!("/repos/{owner}/{name}/pulls/{number}"), &[])
            .await?;

        Ok(PullRequestDetails {
            number: pr.number,
            title: pr.title,
            html_url: pr.html_url,
            head_sha: pr.head.sha,
            base_ref: pr.base.ref_field,
            node_id: pr.node_id,
            is_draft: pr.draft.unwrap_or(false),
            mergeable: pr.mergeable,
        })
    }

    async fn get_combined_commit_status(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> Result<CombinedStatus> {
        debug!(owner, name, sha, "getting combined status");
        let status: ApiCombinedStatus = self
            .get_json(&format!("/repos/{owner}/{name}/commits/{sha}/status"), &[])
            .await?;

        Ok(CombinedStatus {
            state: commit_state(&status.state),
            total_count: status.total_count,
            statuses: status
                .statuses
                .into_iter()
                .map(|s| CommitStatus {
                    state: commit_state(&s.state),
                    context: s.context,
                })
                .collect(),
        })
    }

    async fn list_check_suites_for_ref(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> Result<Vec<CheckSuite>> {
        debug!(owner, name, sha, "listing check suites");
        let suites: ApiCheckSuites = self
            .get_json(
                &format!("/repos/{owner}/{name}/commits/{sha}/check-suites"),
                &[("per_page", LIST_PAGE_SIZE.to_string())],
            )
            .await?;

        Ok(suites
            .check_suites
            .into_iter()
            .map(|suite| CheckSuite {
                id: suite.id,
                status: CheckStatus::from_api(suite.status.as_deref().unwrap_or_default()),
                conclusion: suite.conclusion.as_deref().and_then(CheckConclusion::from_api),
            })
            .collect())
    }

    async fn list_check_runs_for_suite(
        &self,
        owner: &str,
        name: &str,
        suite_id: u64,
    ) -> Result<Vec<CheckRun>> {
        debug!(owner, name, suite_id, "listing check runs");
        let runs: ApiCheckRuns = self
            .get_json(
                &format!("/repos/{owner}/{name}/check-suites/{suite_id}/check-runs"),
                &[("per_page", LIST_PAGE_SIZE.to_string())],
            )
            .await?;

        Ok(runs
            .check_runs
            .into_iter()
            .map(|run| CheckRun {
                status: CheckStatus::from_api(&run.status),
                conclusion: run.conclusion.as_deref().and_then(CheckConclusion::from_api),
                name: run.name,
            })
            .collect())
    }

    async fn list_reviews(&self, owner: &str, name: &str, number: u64) -> Result<Vec<Review>> {
        debug!(owner, name, number, "listing reviews");
        let reviews: Vec<ApiReview> = self
            .get_pages(
                &format!("/repos/{owner}/{name}/pulls/{number}/reviews"),
                &[],
                LIST_PAGE_SIZE,
                LIST_MAX_PAGES,
            )
            .await?;

        Ok(reviews
            .into_iter()
            // Reviews from deleted accounts have no user
            .filter_map(|review| {
                let user = review.user?;
                Some(Review {
                    reviewer_is_bot: user.kind == "Bot",
                    reviewer: user.login,
                    author_association: AuthorAssociation::from_api(&review.author_association),
                    state: review_state(&review.state),
                    submitted_at: review.submitted_at,
                })
            })
            .collect())
    }

    async fn approve(&self, owner: &str, name: &str, number: u64) -> Result<()> {
        debug!(owner, name, number, "approving PR");
        let _: serde_json::Value = self
            .client
            .post(
                format!("/repos/{owner}/{name}/pulls/{number}/reviews"),
                Some(&serde_json::json!({ "event": "APPROVE" })),
            )
            .await?;
        debug!(number, "approved PR");
        Ok(())
    }

    async fn merge_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        method: MergeMethod,
    ) -> Result<MergeResult> {
        debug!(owner, name, number, %method, "merging PR");

        let octocrab_method = match method {
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
        };

        let result = self
            .client
            .pulls(owner, name)
            .merge(number)
            .method(octocrab_method)
            .send()
            .await?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }

    async fn enable_auto_merge(&self, node_id: &str, method: MergeMethod) -> Result<()> {
        debug!(node_id, %method, "enabling auto-merge");

        let response = self
            .http_client
            .post(&self.graphql_url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&serde_json::json!({
                "query": ENABLE_AUTO_MERGE_MUTATION,
                "variables": {
                    "pullRequestId": node_id,
                    "mergeMethod": graphql_merge_method(method),
                }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(status.as_u16(), body));
        }

        let response: GraphQlResponse<serde_json::Value> = response.json().await?;

        // Check for GraphQL errors
        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GitHubApi(format!(
                "GraphQL error: {}",
                messages.join(", ")
            )));
        }

        if response.data.is_none() {
            return Err(Error::GitHubApi("No data in GraphQL response".to_string()));
        }

        debug!(node_id, "enabled auto-merge");
        Ok(())
    }
}
