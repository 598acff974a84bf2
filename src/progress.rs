//! Progress reporting for long-running operations

use async_trait::async_trait;

/// Receives human-readable progress messages from the merge engine
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called for each progress message
    async fn on_message(&self, message: &str);
}

/// Progress sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

#[async_trait]
impl ProgressCallback for NoProgress {
    async fn on_message(&self, _message: &str) {}
}
