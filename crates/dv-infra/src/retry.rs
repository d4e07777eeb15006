//! Generic backoff-retry executor for network operations.

use std::future::Future;

use dv_core::retry::{ApiError, RetryPolicy};
use tokio::time::sleep;
use tracing::{error, warn};

/// Runs `operation`, retrying per `policy` on retryable failures.
///
/// Non-retryable errors rethrow immediately without delay. Retryable errors
/// are retried up to `policy.max_retries` times with exponential backoff;
/// the last error is rethrown once attempts are exhausted.
pub async fn with_retry<T, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !policy.is_retryable(&err) {
                    error!(op = label, attempt, error = %err, "non-retryable failure");
                    return Err(err);
                }
                if attempt > policy.max_retries {
                    error!(op = label, attempt, error = %err, "retries exhausted");
                    return Err(err);
                }
                let backoff = policy.delay_for(attempt);
                warn!(
                    op = label,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "retrying after backoff"
                );
                sleep(backoff).await;
            }
        }
    }
}
