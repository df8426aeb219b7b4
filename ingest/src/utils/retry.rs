use std::future::Future;

use tracing::warn;

use crate::utils::time::sleep_with_jitter;

/// Retries a fetch operation with exponential backoff and jitter, returning
/// the last error once the attempt budget is spent.
pub async fn retry_with_backoff<T, F, Fut>(
    retries: u32,
    base_delay_ms: u64,
    operation: F,
) -> common::Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = common::Result<T>>,
{
    let mut delay = base_delay_ms;
    let mut remaining = retries;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if remaining == 0 {
                    return Err(e);
                }

                remaining -= 1;
                warn!(error = %e, remaining, "Fetch attempt failed, retrying");
                sleep_with_jitter(delay, delay / 2).await;
                delay *= 2;
            }
        }
    }
}
