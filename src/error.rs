//! Error types for dependabot-helper

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while evaluating or merging pull requests
#[derive(Debug, Error)]
pub enum Error {
    /// A repository, branch protection rule or other resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The credentials were rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The credentials lack access to the resource
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Primary or secondary rate limit hit
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The host refused a merge because the pull request is not mergeable (yet)
    #[error("pull request is not mergeable: {0}")]
    NotMergeable(String),

    /// No merge method permitted by the repository is available
    #[error("no valid merge method is enabled for {0}")]
    NoMergeMethod(String),

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable credentials
    #[error("authentication error: {0}")]
    Auth(String),

    /// Any other GitHub API failure
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Platform error not tied to a specific HTTP status
    #[error("platform error: {0}")]
    Platform(String),

    /// The caller cancelled the operation
    #[error("operation cancelled")]
    Cancelled,

    /// Internal error (serialization, I/O glue)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error must abort a whole batch rather than a single PR.
    ///
    /// Authorization and rate-limit failures affect every remaining call,
    /// so continuing with the next pull request is pointless.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_)
                | Self::Forbidden(_)
                | Self::RateLimited(_)
                | Self::Auth(_)
                | Self::Cancelled
        )
    }

    /// Whether this is the retryable "not mergeable" kind
    pub const fn is_not_mergeable(&self) -> bool {
        matches!(self, Self::NotMergeable(_))
    }

    /// Whether this is a 404-equivalent
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Classify an HTTP status code and message into an error kind
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => Self::Unauthorized(message),
            403 if message.to_lowercase().contains("rate limit") => Self::RateLimited(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            405 => Self::NotMergeable(message),
            429 => Self::RateLimited(message),
            _ => Self::GitHubApi(format!("{status}: {message}")),
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                Self::from_status(source.status_code.as_u16(), source.message.clone())
            }
            other => Self::GitHubApi(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::from_status(status.as_u16(), err.to_string()),
            None => Self::GitHubApi(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}
