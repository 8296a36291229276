//! Retry policy for the HTTP collaborator.
//!
//! Only transport-level hiccups are retried. Anything that reached the
//! extractors, or was rejected before a request went out, is final.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// A 429 or a connection-level failure may clear up on its own; every other
/// variant would fail the same way again.
fn is_transient(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::RateLimited { .. } | ScraperError::Http(_)
    )
}

/// Runs `request` until it succeeds, fails permanently, or `max_retries`
/// extra attempts have been spent.
///
/// Before retry `n` (0-based) the call sleeps `backoff_base_secs * 2^n`
/// seconds. With `max_retries = 0` this is a plain single attempt.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut request: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match request().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_transient(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
