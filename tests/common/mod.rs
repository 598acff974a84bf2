//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{AutoMergeCall, MergeCall, MergeOutcome, MockPlatformService};

use chrono::{TimeZone, Utc};
use dependabot_helper::cache::Cache;
use dependabot_helper::config::Options;
use dependabot_helper::session::UserSession;
use dependabot_helper::types::{
    AuthorAssociation, CheckConclusion, CheckRun, CheckStatus, CheckSuite, Owner,
    PullRequestDetails, Repository, Review, ReviewState, Visibility,
};
use std::sync::Arc;

pub const LOGIN: &str = "octocat";
pub const OWNER: &str = "acme";
pub const REPO: &str = "widgets";
pub const DEPENDABOT: &str = "dependabot[bot]";

pub fn owner(login: &str) -> Owner {
    Owner {
        login: login.to_string(),
        name: None,
        avatar_url: format!("https://avatars.example/{login}"),
        html_url: format!("https://github.com/{login}"),
        is_bot: login.ends_with("[bot]"),
    }
}

pub fn repository(merge: bool, rebase: bool, squash: bool) -> Repository {
    Repository {
        id: 42,
        owner: OWNER.to_string(),
        name: REPO.to_string(),
        html_url: format!("https://github.com/{OWNER}/{REPO}"),
        is_fork: false,
        visibility: Visibility::Public,
        allow_merge_commit: merge,
        allow_rebase_merge: rebase,
        allow_squash_merge: squash,
    }
}

pub fn named_repository(name: &str, is_fork: bool, visibility: Visibility) -> Repository {
    Repository {
        name: name.to_string(),
        is_fork,
        visibility,
        ..repository(true, true, true)
    }
}

/// Open, mergeable PR against main with head `sha{number}`
pub fn pr(number: u64) -> PullRequestDetails {
    PullRequestDetails {
        number,
        title: format!("Bump dependency {number}"),
        html_url: format!("https://github.com/{OWNER}/{REPO}/pull/{number}"),
        head_sha: sha(number),
        base_ref: "main".to_string(),
        node_id: Some(format!("PR_node_{number}")),
        is_draft: false,
        mergeable: Some(true),
    }
}

pub fn sha(number: u64) -> String {
    format!("sha{number}")
}

pub fn review(login: &str, state: ReviewState, minute: u32) -> Review {
    Review {
        reviewer: login.to_string(),
        reviewer_is_bot: false,
        author_association: AuthorAssociation::Member,
        state,
        submitted_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).single(),
    }
}

pub fn suite(id: u64, status: CheckStatus, conclusion: Option<CheckConclusion>) -> CheckSuite {
    CheckSuite {
        id,
        status,
        conclusion,
    }
}

pub fn run(name: &str, conclusion: Option<CheckConclusion>) -> CheckRun {
    CheckRun {
        name: name.to_string(),
        status: if conclusion.is_some() {
            CheckStatus::Completed
        } else {
            CheckStatus::InProgress
        },
        conclusion,
    }
}

/// Mock serving a repository that permits every merge method
pub fn mock() -> Arc<MockPlatformService> {
    Arc::new(MockPlatformService::new(LOGIN, repository(true, true, true)))
}

/// Options with caching on and retries without waits
pub fn options() -> Options {
    Options {
        merge_retry_waits_ms: Vec::new(),
        ..Options::default()
    }
}

pub fn session(platform: &Arc<MockPlatformService>, options: &Options) -> UserSession {
    UserSession::new(platform.clone(), Cache::in_memory(options), LOGIN)
}
