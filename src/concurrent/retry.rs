//! Retry fallible async operations with backoff.

use std::future::Future;

use tokio::time::sleep;

use crate::error::RetryPolicy;

/// Runs `operation` until it succeeds or the policy's retries are
/// exhausted, sleeping the policy's backoff delay between tries.
///
/// The operation runs once plus up to `max_retries` more times; when the
/// last try fails its error is returned.
///
/// ```
/// use jstream::{concurrent::retry_with_policy, RetryPolicy};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), std::io::Error> {
/// let policy = RetryPolicy::Fixed {
///     max_retries: 2,
///     delay: Duration::from_millis(10),
/// };
/// let value = retry_with_policy(&policy, || async { fetch().await }).await?;
/// # Ok(())
/// # }
/// # async fn fetch() -> Result<u32, std::io::Error> { Ok(42) }
/// ```
pub async fn retry_with_policy<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_retries = policy.max_retries();
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= max_retries {
                    return Err(error);
                }
                if let Some(delay) = policy.backoff_delay(attempt) {
                    sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}
