//! Shared command context for CLI commands
//!
//! Extracts the setup shared by every command: options, credentials,
//! the platform service and the signed-in session.

use dependabot_helper::auth::get_github_auth;
use dependabot_helper::cache::Cache;
use dependabot_helper::config::{Options, default_config_path, load_options};
use dependabot_helper::error::{Error, Result};
use dependabot_helper::platform::GitHubService;
use dependabot_helper::session::UserSession;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Shared context for CLI commands that interact with GitHub
pub struct CommandContext {
    /// Loaded options
    pub options: Options,
    /// Cached platform access for the signed-in user
    pub session: UserSession,
    /// Fired on Ctrl-C
    pub cancel: CancellationToken,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// - Load options (explicit path, else the default location)
    /// - Resolve the GitHub token
    /// - Create the platform service and sign in
    pub async fn new(config: Option<&Path>, cancel: CancellationToken) -> Result<Self> {
        let options = match config {
            Some(path) => load_options(path)?,
            None => match default_config_path() {
                Some(path) => load_options(&path)?,
                None => Options::default(),
            },
        };
        options.validate()?;

        let auth = get_github_auth().await?;
        debug!(source = ?auth.source, "resolved GitHub token");

        let platform = GitHubService::new(&auth.token, options.api_host.as_deref())?;
        let cache = Cache::in_memory(&options);
        let session = UserSession::sign_in(Arc::new(platform), cache)
            .await
            .map_err(|e| match e {
                Error::Unauthorized(msg) => {
                    Error::Auth(format!("GitHub rejected the token ({msg}); run 'gh auth login'"))
                }
                other => other,
            })?;

        Ok(Self {
            options,
            session,
            cancel,
        })
    }
}
