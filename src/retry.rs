//! Bounded retry for fallible async operations

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Run an async operation with a bounded number of retries and a fixed
/// delay between attempts.
///
/// Makes one initial attempt plus up to `max_retries` retries. The same
/// combinator drives both provider initialization and language changes.
pub async fn retry_with_delay<T, E, F, Fut>(
    mut operation: F,
    max_retries: u32,
    delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < max_retries => {
                attempt += 1;
                tracing::warn!(attempt, max_retries, error = %error, "retrying after failure");
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
