//! Sequential batch execution.
//!
//! Items run one after another. The first item that still fails after its
//! retries stops the batch; everything before it stays submitted.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::{Error, Result};

/// Fixed-delay retry for each batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries per item, including the first. Zero behaves like one.
    pub attempts: u32,
    pub delay:    Duration,
}

impl RetryPolicy {
    /// One try, no retry.
    pub const NONE: RetryPolicy = RetryPolicy { attempts: 1, delay: Duration::ZERO };

    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::NONE
    }
}

/// The item that stopped a batch.
#[derive(Debug)]
pub struct BatchFailure {
    pub index: usize,
    pub error: Error,
}

/// What a batch achieved: results for the items that succeeded, in order,
/// and the failure that stopped it, if any.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub completed: Vec<T>,
    pub failure:   Option<BatchFailure>,
}

impl<T> BatchOutcome<T> {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// All results, or the failure that stopped the batch.
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.failure {
            None    => Ok(self.completed),
            Some(f) => Err(f.error),
        }
    }
}

/// Run `op` over `items` in order.
///
/// Failed items are retried per `policy`, except validation errors, which
/// would fail the same way again.
pub async fn run_batch<I, T, F, Fut>(items: &[I], policy: RetryPolicy, mut op: F) -> BatchOutcome<T>
where
    F:   FnMut(usize, &I) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut completed = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let mut attempt = 1;
        let result = loop {
            match op(index, item).await {
                Ok(value) => break Ok(value),
                Err(e) if e.is_validation() || attempt >= attempts => break Err(e),
                Err(e) => {
                    log::warn!(
                        "batch item {index}: attempt {attempt}/{attempts} failed: {e}. Retrying in {:?}...",
                        policy.delay
                    );
                    sleep(policy.delay).await;
                    attempt += 1;
                }
            }
        };

        match result {
            Ok(value) => completed.push(value),
            Err(error) => {
                log::warn!("batch stopped at item {index} after {} completed: {error}", completed.len());
                return BatchOutcome { completed, failure: Some(BatchFailure { index, error }) };
            }
        }
    }

    BatchOutcome { completed, failure: None }
}
