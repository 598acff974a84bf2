//! Merge planning - pure functions for choosing how and what to merge
//!
//! No I/O happens here; the executor gathers the repository and candidates
//! beforehand, which keeps method selection and ordering unit-testable.

use crate::error::{Error, Result};
use crate::types::{Candidate, MergeMethod, Repository};
use std::fmt;

/// Build the ordered preference list (PURE)
///
/// The user's choice comes first, then the configured preferences, then the
/// fixed fallback order so every method appears exactly once.
#[must_use]
pub fn merge_preferences(user: Option<MergeMethod>, configured: &[MergeMethod]) -> Vec<MergeMethod> {
    let mut preferences = Vec::with_capacity(MergeMethod::FALLBACK_ORDER.len());
    for method in user
        .into_iter()
        .chain(configured.iter().copied())
        .chain(MergeMethod::FALLBACK_ORDER)
    {
        if !preferences.contains(&method) {
            preferences.push(method);
        }
    }
    preferences
}

/// Pick the first preferred method the repository permits (PURE)
pub fn select_merge_method(repository: &Repository, preferences: &[MergeMethod]) -> Result<MergeMethod> {
    preferences
        .iter()
        .copied()
        .find(|method| repository.allows(*method))
        .ok_or_else(|| Error::NoMergeMethod(repository.full_name()))
}

/// A single merge to attempt
#[derive(Debug, Clone)]
pub struct MergeStep {
    /// PR number
    pub number: u64,
    /// PR title (for display)
    pub title: String,
    /// GraphQL node ID for the auto-merge fallback
    pub node_id: Option<String>,
}

impl fmt::Display for MergeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "merge PR #{}: {}", self.number, self.title)
    }
}

/// Merge plan - the functional core output
///
/// Created by [`create_merge_plan`] (pure) and carried out by
/// [`super::merge_eligible_pull_requests`] (effectful).
#[derive(Debug, Clone)]
pub struct MergePlan {
    /// Method used for every step
    pub method: MergeMethod,
    /// Steps in attempt order (newest PR first)
    pub steps: Vec<MergeStep>,
}

impl MergePlan {
    /// Check if the plan has nothing to merge
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of merges to attempt
    #[must_use]
    pub fn merge_count(&self) -> usize {
        self.steps.len()
    }
}

/// Create a merge plan (PURE - no I/O, easily testable)
///
/// `candidates` come from a merge scan and are already filtered; they are
/// attempted in descending PR number order whatever order they arrive in.
pub fn create_merge_plan(
    repository: &Repository,
    candidates: &[Candidate],
    preferences: &[MergeMethod],
) -> Result<MergePlan> {
    let method = select_merge_method(repository, preferences)?;

    let mut steps: Vec<MergeStep> = candidates
        .iter()
        .map(|c| MergeStep {
            number: c.number,
            title: c.title.clone(),
            node_id: c.node_id.clone(),
        })
        .collect();
    steps.sort_by(|a, b| b.number.cmp(&a.number));

    Ok(MergePlan { method, steps })
}
