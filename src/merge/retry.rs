//! Retry with an explicit wait schedule

use crate::cancel;
use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Retry an operation, waiting the i-th configured duration before retry i.
///
/// One initial attempt plus one retry per wait. Only errors accepted by the
/// predicate are retried; anything else is returned immediately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    waits: Vec<Duration>,
}

impl RetryPolicy {
    /// Create a policy from a wait schedule
    pub const fn new(waits: Vec<Duration>) -> Self {
        Self { waits }
    }

    /// Total number of attempts, including the first
    pub fn max_attempts(&self) -> usize {
        self.waits.len() + 1
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// schedule is exhausted (the last error is returned).
    ///
    /// Waits are cut short by `cancel`, yielding [`Error::Cancelled`].
    pub async fn execute<T, F, Fut, P>(
        &self,
        cancel: &CancellationToken,
        is_retryable: P,
        mut op: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&Error) -> bool,
    {
        let mut attempt = 1;
        loop {
            match cancel::cancellable(cancel, op()).await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) => {
                    let Some(wait) = self.waits.get(attempt - 1) else {
                        return Err(e);
                    };
                    debug!(attempt, wait_ms = wait.as_millis(), error = %e, "retrying");
                    cancel::sleep(cancel, *wait).await?;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
