//! GitHub token lookup

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use tokio::process::Command;
use tracing::debug;

/// Environment variables checked for a token, in order
const TOKEN_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Resolved GitHub credentials
#[derive(Clone)]
pub struct GitHubAuthConfig {
    /// Personal access or OAuth token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
}

impl std::fmt::Debug for GitHubAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuthConfig")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// First non-empty token among the known environment variables.
///
/// `lookup` stands in for `std::env::var` so the order can be tested.
pub fn resolve_env_token(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    TOKEN_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
}

/// Get GitHub authentication: `GH_TOKEN`, `GITHUB_TOKEN`, then `gh auth token`
pub async fn get_github_auth() -> Result<GitHubAuthConfig> {
    if let Some(token) = resolve_env_token(|var| std::env::var(var).ok()) {
        debug!("using GitHub token from environment");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
        });
    }

    debug!("no token in environment, trying gh auth token");
    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .await
        .map_err(|e| Error::Auth(format!("failed to run gh: {e}")))?;

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() || token.is_empty() {
        return Err(Error::Auth(
            "GitHub token not found. Set GH_TOKEN, GITHUB_TOKEN, or run 'gh auth login'"
                .to_string(),
        ));
    }

    Ok(GitHubAuthConfig {
        token,
        source: AuthSource::Cli,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_gh_token_wins() {
        let token = resolve_env_token(env(&[("GH_TOKEN", "a"), ("GITHUB_TOKEN", "b")]));
        assert_eq!(token.as_deref(), Some("a"));
    }

    #[test]
    fn test_blank_gh_token_falls_through() {
        let token = resolve_env_token(env(&[("GH_TOKEN", "  "), ("GITHUB_TOKEN", "b\n")]));
        assert_eq!(token.as_deref(), Some("b"));
    }

    #[test]
    fn test_no_token() {
        assert!(resolve_env_token(env(&[])).is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = GitHubAuthConfig {
            token: "secret".to_string(),
            source: AuthSource::EnvVar,
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
