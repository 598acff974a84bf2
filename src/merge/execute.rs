//! Merge execution - effectful operations
//!
//! Takes a `MergePlan` (created by the pure planning functions) and performs
//! the merges one at a time through the retry policy, falling back to
//! auto-merge for pull requests that never become mergeable.

use crate::cancel::cancellable;
use crate::config::Options;
use crate::error::{Error, Result};
use crate::merge::plan::{MergePlan, MergeStep, create_merge_plan, merge_preferences};
use crate::merge::retry::RetryPolicy;
use crate::progress::ProgressCallback;
use crate::scan::scan_repository;
use crate::session::UserSession;
use crate::types::{MergeMethod, MergeReport};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Merge every eligible bot pull request of a repository (EFFECTFUL)
///
/// 1. Gather - merge scan (no evaluation), then the repository
/// 2. Plan - pick the merge method and attempt order
/// 3. Execute - see [`execute_merge`]
///
/// An empty scan returns an empty report without fetching the repository.
/// A repository that permits none of the merge methods fails the call.
pub async fn merge_eligible_pull_requests(
    session: &UserSession,
    options: &Options,
    owner: &str,
    name: &str,
    user_method: Option<MergeMethod>,
    progress: &dyn ProgressCallback,
    cancel: &CancellationToken,
) -> Result<MergeReport> {
    let candidates =
        match scan_repository(session, options, owner, name, &options.creators, false, cancel).await
        {
            Ok(candidates) => candidates,
            Err(Error::Cancelled) => return Ok(cancelled_report()),
            Err(e) => return Err(e),
        };

    if candidates.is_empty() {
        info!(owner, name, "no pull requests to merge");
        return Ok(MergeReport::default());
    }

    let repository = match cancellable(cancel, session.repository(owner, name)).await {
        Ok(repository) => repository,
        Err(Error::Cancelled) => return Ok(cancelled_report()),
        Err(e) => return Err(e),
    };

    let preferences = merge_preferences(user_method, &options.merge_preferences);
    let plan = create_merge_plan(&repository, &candidates, &preferences)?;
    let policy = RetryPolicy::new(options.merge_retry_waits());

    info!(
        repository = %repository.full_name(),
        method = %plan.method,
        count = plan.merge_count(),
        "merging pull requests"
    );

    execute_merge(session, owner, name, &plan, &policy, progress, cancel).await
}

fn cancelled_report() -> MergeReport {
    MergeReport {
        cancelled: true,
        ..MergeReport::default()
    }
}

/// Execute the merge plan (EFFECTFUL)
///
/// Merges are strictly sequential. Per-PR failures are recorded and the
/// batch continues; errors that affect every further call are returned.
/// On cancellation the report is marked cancelled and holds only merges
/// the host confirmed.
pub async fn execute_merge(
    session: &UserSession,
    owner: &str,
    name: &str,
    plan: &MergePlan,
    policy: &RetryPolicy,
    progress: &dyn ProgressCallback,
    cancel: &CancellationToken,
) -> Result<MergeReport> {
    let mut report = MergeReport::default();

    for step in &plan.steps {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        progress
            .on_message(&format!("Merging PR #{}: {}", step.number, step.title))
            .await;

        let outcome = policy
            .execute(cancel, Error::is_not_mergeable, || {
                session.merge(owner, name, step.number, plan.method)
            })
            .await;

        match outcome {
            Ok(result) if result.merged => {
                info!(
                    number = step.number,
                    sha = result.sha.as_deref().unwrap_or_default(),
                    "merged"
                );
                report.merged.push(step.number);
            }
            Ok(result) => {
                let message = result
                    .message
                    .unwrap_or_else(|| "merge was not performed".to_string());
                warn!(number = step.number, %message, "merge refused");
                report.failed.push((step.number, message));
            }
            Err(Error::Cancelled) => {
                report.cancelled = true;
                break;
            }
            Err(e) if e.is_not_mergeable() => {
                progress
                    .on_message(&format!(
                        "PR #{} is not mergeable yet, enabling auto-merge",
                        step.number
                    ))
                    .await;
                if !fall_back_to_auto_merge(session, step, plan.method, &mut report, cancel).await
                {
                    break;
                }
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(number = step.number, error = %e, "merge failed");
                report.failed.push((step.number, e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Best-effort auto-merge. Errors are logged and recorded, never returned.
///
/// Returns `false` when the batch was cancelled.
async fn fall_back_to_auto_merge(
    session: &UserSession,
    step: &MergeStep,
    method: MergeMethod,
    report: &mut MergeReport,
    cancel: &CancellationToken,
) -> bool {
    let Some(node_id) = step.node_id.as_deref() else {
        warn!(number = step.number, "cannot enable auto-merge without a node id");
        report
            .failed
            .push((step.number, "not mergeable and no node id for auto-merge".to_string()));
        return true;
    };

    match cancellable(cancel, session.enable_auto_merge(node_id, method)).await {
        Ok(()) => {
            info!(number = step.number, "auto-merge enabled");
            report.auto_merge_enabled.push(step.number);
            true
        }
        Err(Error::Cancelled) => {
            report.cancelled = true;
            false
        }
        Err(e) => {
            warn!(number = step.number, error = %e, "failed to enable auto-merge");
            report.failed.push((step.number, e.to_string()));
            true
        }
    }
}
