//! dependabot-helper: evaluate and bulk-merge Dependabot pull requests
//!
//! The library scans repositories for open bot pull requests, computes an
//! approval state and a checks verdict for each, and merges the eligible ones
//! with a bounded retry and an auto-merge fallback.
//!
//! All remote access goes through [`platform::PlatformService`]; lookups are
//! memoized per user by [`session::UserSession`].

pub mod auth;
pub mod cache;
pub mod cancel;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod merge;
pub mod platform;
pub mod progress;
pub mod scan;
pub mod session;
pub mod types;

pub use error::{Error, Result};
pub use merge::merge_eligible_pull_requests;
pub use scan::{
    RepositorySummary, approve_pull_request, list_repositories, scan_repository,
    summarize_repository,
};
pub use session::UserSession;
