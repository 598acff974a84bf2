//! Merge engine for bot pull requests
//!
//! Three-phase pattern:
//! 1. Gather - merge scan and repository lookup (effectful)
//! 2. Plan - create `MergePlan` (pure, testable)
//! 3. Execute - perform merges with retry and auto-merge fallback (effectful)

mod execute;
mod plan;
mod retry;

pub use execute::{execute_merge, merge_eligible_pull_requests};
pub use plan::{MergePlan, MergeStep, create_merge_plan, merge_preferences, select_merge_method};
pub use retry::RetryPolicy;
