//! Merge verdict: combine commit statuses, check suites and required checks
//! into a single [`ChecksStatus`].
//!
//! The order of evaluation matters:
//! 1. required contexts from branch protection
//! 2. combined commit status (sets the initial verdict, records contexts)
//! 3. check suites, unless statuses already failed
//! 4. suite outcome resolved against the status verdict
//! 5. required-context gate, then default to pending

use crate::error::Result;
use crate::session::UserSession;
use crate::types::{CheckConclusion, CheckRun, CheckStatus, CheckSuite, ChecksStatus, CommitState};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Aggregate outcome of a set of check suites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteOutcome {
    /// Every suite passed, or never ran
    AllSuccess,
    /// At least one suite failed
    AnyError,
    /// At least one suite is running
    AnyPending,
    /// No usable signal (e.g. only stale suites)
    Indeterminate,
}

/// Working state while evaluating one commit
#[derive(Debug, Clone, Default)]
pub struct ChecksAggregate {
    /// Verdict so far; `None` while nothing has reported
    pub status: Option<ChecksStatus>,
    /// Context and check names seen as successful
    pub successful: BTreeSet<String>,
}

impl ChecksAggregate {
    /// Record a successful context name
    pub fn record(&mut self, context: impl Into<String>) {
        self.successful.insert(context.into());
    }

    /// Record the names of runs that succeeded
    pub fn record_runs(&mut self, runs: &[CheckRun]) {
        for run in runs {
            if matches!(
                run.conclusion,
                Some(CheckConclusion::Neutral | CheckConclusion::Success)
            ) {
                self.record(run.name.clone());
            }
        }
    }

    /// Apply the required-context gate and the pending default.
    ///
    /// A required check that never reported is still waiting, so a
    /// success verdict is downgraded to pending rather than error.
    pub fn finish(self, required: &BTreeSet<String>) -> ChecksStatus {
        match self.status {
            Some(ChecksStatus::Success)
                if !required.is_empty() && !self.successful.is_superset(required) =>
            {
                ChecksStatus::Pending
            }
            Some(status) => status,
            None => ChecksStatus::Pending,
        }
    }
}

/// Map the combined commit state onto the verdict
pub const fn commit_state_verdict(state: CommitState) -> ChecksStatus {
    match state {
        CommitState::Failure | CommitState::Error => ChecksStatus::Error,
        CommitState::Success => ChecksStatus::Success,
        CommitState::Pending => ChecksStatus::Pending,
    }
}

/// Classify suites.
///
/// A suite with no conclusion that is not running never ran (an installed
/// app that has nothing to do) and counts as success.
pub fn classify_suites<'a>(suites: impl IntoIterator<Item = &'a CheckSuite> + Clone) -> SuiteOutcome {
    let passed = |suite: &CheckSuite| match suite.conclusion {
        Some(CheckConclusion::Neutral | CheckConclusion::Skipped | CheckConclusion::Success) => {
            true
        }
        None => suite.status != CheckStatus::InProgress,
        Some(_) => false,
    };
    let failed = |suite: &CheckSuite| {
        matches!(
            suite.conclusion,
            Some(
                CheckConclusion::ActionRequired
                    | CheckConclusion::Cancelled
                    | CheckConclusion::Failure
                    | CheckConclusion::TimedOut
            )
        )
    };
    let running =
        |suite: &CheckSuite| suite.conclusion.is_none() && suite.status == CheckStatus::InProgress;

    if suites.clone().into_iter().all(passed) {
        SuiteOutcome::AllSuccess
    } else if suites.clone().into_iter().any(failed) {
        SuiteOutcome::AnyError
    } else if suites.into_iter().any(running) {
        SuiteOutcome::AnyPending
    } else {
        SuiteOutcome::Indeterminate
    }
}

/// Resolve a suite outcome against the verdict from commit statuses.
///
/// Error beats pending beats success; an error from statuses is never
/// overridden by passing suites.
pub const fn resolve(status: Option<ChecksStatus>, suites: SuiteOutcome) -> Option<ChecksStatus> {
    match (suites, status) {
        (SuiteOutcome::AllSuccess, Some(ChecksStatus::Error)) => Some(ChecksStatus::Error),
        (SuiteOutcome::AllSuccess, Some(ChecksStatus::Pending)) => Some(ChecksStatus::Pending),
        (SuiteOutcome::AllSuccess, _) => Some(ChecksStatus::Success),
        (SuiteOutcome::AnyError, _) => Some(ChecksStatus::Error),
        (SuiteOutcome::AnyPending, _) => Some(ChecksStatus::Pending),
        (SuiteOutcome::Indeterminate, status) => status,
    }
}

/// Compute the merge verdict for a commit on a PR targeting `base_branch`
pub async fn evaluate_checks_status(
    session: &UserSession,
    owner: &str,
    name: &str,
    sha: &str,
    base_branch: &str,
) -> Result<ChecksStatus> {
    let required = session
        .branch_protection(owner, name, base_branch)
        .await?
        .map(|p| p.required_status_checks)
        .unwrap_or_default();

    let mut aggregate = ChecksAggregate::default();

    let combined = session.combined_status(owner, name, sha).await?;
    if combined.total_count > 0 {
        aggregate.status = Some(commit_state_verdict(combined.state));
    }
    for status in &combined.statuses {
        aggregate.record(status.context.clone());
    }

    if aggregate.status != Some(ChecksStatus::Error) {
        let suites = session.check_suites(owner, name, sha).await?;
        let mut runs_by_suite: HashMap<u64, Vec<CheckRun>> = HashMap::new();
        let mut candidates: Vec<&CheckSuite> = Vec::new();

        for suite in &suites {
            match suite.status {
                CheckStatus::InProgress | CheckStatus::Completed => candidates.push(suite),
                CheckStatus::Queued => {
                    // Apps that registered a suite but never created a run are noise
                    let runs = session.check_runs(owner, name, suite.id).await?;
                    if !runs.is_empty() {
                        candidates.push(suite);
                        runs_by_suite.insert(suite.id, runs);
                    }
                }
            }
        }

        if !required.is_empty() {
            for suite in &candidates {
                let runs = match runs_by_suite.remove(&suite.id) {
                    Some(runs) => runs,
                    None => session.check_runs(owner, name, suite.id).await?,
                };
                aggregate.record_runs(&runs);
            }
        }

        if !candidates.is_empty() {
            let outcome = classify_suites(candidates.iter().copied());
            aggregate.status = resolve(aggregate.status, outcome);
        }
    }

    let verdict = aggregate.finish(&required);
    debug!(owner, name, sha, %verdict, "evaluated checks");
    Ok(verdict)
}
