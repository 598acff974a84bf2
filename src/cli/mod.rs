//! CLI command implementations

mod approve;
mod context;
mod merge;
mod prs;
mod repos;
mod style;

pub use approve::run_approve;
pub use context::CommandContext;
pub use merge::{MergeOptions, run_merge};
pub use prs::run_prs;
pub use repos::run_repos;

use async_trait::async_trait;
use dependabot_helper::progress::ProgressCallback;
use indicatif::ProgressBar;
use std::time::Duration;

/// Progress reporting through a terminal spinner
pub struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    /// Start a spinner with an initial message
    pub fn spinner(message: impl Into<String>) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style::spinner_style());
        spinner.set_message(message.into());
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    /// Remove the spinner from the terminal
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }
}
