//! Repository scanning: find the open bot pull requests of a repository and
//! turn them into [`Candidate`]s.

use crate::cancel::cancellable;
use crate::config::Options;
use crate::error::Result;
use crate::evaluate::{evaluate_approval, evaluate_checks_status};
use crate::platform::IssueQuery;
use crate::session::UserSession;
use crate::types::{Candidate, Repository, Visibility};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Scan a repository for bot pull requests.
///
/// With `fetch_statuses` the candidates carry approval and checks verdicts
/// for display. Without it the scan feeds a merge pass: evaluation is
/// skipped and pull requests the host reports as unmergeable are dropped.
/// Drafts are always dropped.
///
/// Errors for a single pull request are logged and the PR is skipped, unless
/// they affect every further call (see [`crate::error::Error::is_fatal`]).
/// Failing to list issues fails the scan.
///
/// Candidates are returned newest first.
pub async fn scan_repository(
    session: &UserSession,
    options: &Options,
    owner: &str,
    name: &str,
    creators: &[String],
    fetch_statuses: bool,
    cancel: &CancellationToken,
) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();
    let mut seen = HashSet::new();

    for creator in creators {
        let query = IssueQuery {
            creator,
            labels: &options.labels,
            page_size: options.page_size,
            page_count: options.page_count,
        };
        let issues = cancellable(cancel, session.issues(owner, name, &query)).await?;
        debug!(owner, name, creator, count = issues.len(), "listed bot issues");

        for issue in issues {
            if !issue.is_pull_request || !seen.insert(issue.number) {
                continue;
            }

            match scan_pull_request(session, owner, name, issue.number, fetch_statuses, cancel)
                .await
            {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(owner, name, number = issue.number, error = %e, "skipping pull request");
                }
            }
        }
    }

    candidates.sort_by(|a, b| b.number.cmp(&a.number));
    Ok(candidates)
}

async fn scan_pull_request(
    session: &UserSession,
    owner: &str,
    name: &str,
    number: u64,
    fetch_statuses: bool,
    cancel: &CancellationToken,
) -> Result<Option<Candidate>> {
    let details = cancellable(cancel, session.pull_request(owner, name, number)).await?;

    if details.is_draft {
        debug!(number, "skipping draft");
        return Ok(None);
    }

    let candidate = Candidate::from_details(owner, name, details);

    if !fetch_statuses {
        if candidate.mergeable == Some(false) {
            debug!(number, "skipping unmergeable pull request");
            return Ok(None);
        }
        return Ok(Some(candidate));
    }

    let approval = cancellable(
        cancel,
        evaluate_approval(
            session,
            owner,
            name,
            number,
            &candidate.base_ref,
            session.login(),
        ),
    )
    .await?;
    let status = cancellable(
        cancel,
        evaluate_checks_status(session, owner, name, &candidate.head_sha, &candidate.base_ref),
    )
    .await?;

    Ok(Some(candidate.evaluated(approval, status)))
}

/// A repository with its bot pull requests, for display
#[derive(Debug, Clone)]
pub struct RepositorySummary {
    /// The repository
    pub repository: Repository,
    /// Evaluated candidates, newest first
    pub pull_requests: Vec<Candidate>,
    /// Whether a Dependabot config file is present
    pub has_dependabot_config: bool,
}

/// Fetch a repository, run a display scan and check for a Dependabot config
pub async fn summarize_repository(
    session: &UserSession,
    options: &Options,
    owner: &str,
    name: &str,
    cancel: &CancellationToken,
) -> Result<RepositorySummary> {
    let repository = cancellable(cancel, session.repository(owner, name)).await?;
    let pull_requests =
        scan_repository(session, options, owner, name, &options.creators, true, cancel).await?;
    let has_dependabot_config =
        cancellable(cancel, session.has_dependabot_config(owner, name)).await?;

    Ok(RepositorySummary {
        repository,
        pull_requests,
        has_dependabot_config,
    })
}

/// Submit an approving review as the session's user
pub async fn approve_pull_request(
    session: &UserSession,
    owner: &str,
    name: &str,
    number: u64,
) -> Result<()> {
    session.approve(owner, name, number).await?;
    debug!(owner, name, number, login = session.login(), "approved");
    Ok(())
}

/// List the repositories of `owner` that pass the fork and visibility filters.
///
/// `owner` may be the signed-in user, one of their organizations, or any
/// other user (public repositories only).
pub async fn list_repositories(
    session: &UserSession,
    options: &Options,
    owner: &str,
) -> Result<Vec<Repository>> {
    let repositories = if owner.eq_ignore_ascii_case(session.login()) {
        session.own_repositories().await?
    } else if let Some(org) = session
        .organizations()
        .await?
        .into_iter()
        .find(|org| org.login.eq_ignore_ascii_case(owner))
    {
        session.org_repositories(&org.login).await?
    } else {
        session.user_repositories(owner).await?
    };

    Ok(filter_repositories(repositories, options))
}

/// Apply the fork and visibility filters and sort by name (PURE)
pub fn filter_repositories(repositories: Vec<Repository>, options: &Options) -> Vec<Repository> {
    let mut repositories: Vec<Repository> = repositories
        .into_iter()
        .filter(|r| options.include_forks || !r.is_fork)
        .filter(|r| options.include_private || r.visibility == Visibility::Public)
        .collect();
    repositories.sort_by_key(|r| r.name.to_lowercase());
    repositories
}
