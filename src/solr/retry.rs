// Retry helper for Solr admin requests: a fixed backoff between a bounded number
// of attempts.

use crate::error::ExporterError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not counting the initial attempt).
    pub max_retries: u32,
    /// Delay before each retry.
    pub backoff: Duration,
}

/// Result of a single attempt, used by the caller to signal retryability.
pub enum RetryAction<T> {
    /// Operation succeeded.
    Success(T),
    /// Operation failed with a retryable error (network, timeout, non-2xx status).
    Retry(ExporterError),
    /// Operation failed with a non-retryable error.
    Fail(ExporterError),
}

/// Execute an async operation, retrying after `policy.backoff` on retryable failures.
///
/// The `operation` closure receives the current attempt number (0-indexed).
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    operation: F,
) -> Result<T, ExporterError>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = RetryAction<T>>,
{
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            RetryAction::Success(value) => return Ok(value),
            RetryAction::Fail(err) => return Err(err),
            RetryAction::Retry(err) => {
                if attempt >= policy.max_retries {
                    return Err(err);
                }
                warn!(
                    attempt = attempt + 1,
                    max = policy.max_retries,
                    delay_ms = policy.backoff.as_millis() as u64,
                    error = %err,
                    "Retrying Solr request after transient error"
                );
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
        }
    }
}

/// Classify a reqwest error as retryable or non-retryable.
///
/// Builder and redirect errors will not change on a second attempt.
pub fn is_retryable_reqwest_error(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() || e.is_decode()
}
