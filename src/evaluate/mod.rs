//! Per-PR evaluation: approval state and merge verdict

mod approval;
mod checks;

pub use approval::{decide_approval, evaluate_approval, latest_counted_reviews};
pub use checks::{
    ChecksAggregate, SuiteOutcome, classify_suites, commit_state_verdict, evaluate_checks_status,
    resolve,
};
