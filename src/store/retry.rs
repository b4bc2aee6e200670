//! Retry policy for transient store failures.

use super::StoreResult;
use std::time::Duration;
use tracing::debug;

/// Backoff settings for retrying transient store errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, initial_delay_ms: 100, max_delay_ms: 5_000 }
    }
}

impl RetryConfig {
    /// Single attempt, no waiting.
    #[must_use]
    pub fn none() -> Self {
        Self { max_attempts: 1, initial_delay_ms: 0, max_delay_ms: 0 }
    }

    /// Default attempt count with zero delays, so tests exercising the
    /// retry path never sleep.
    #[must_use]
    pub fn immediate() -> Self {
        Self { max_attempts: 3, initial_delay_ms: 0, max_delay_ms: 0 }
    }
}

/// Run `operation`, retrying transient failures with exponential backoff
/// (delay doubles per attempt, capped at `max_delay_ms`).
///
/// Non-transient errors and attempt exhaustion return the last error.
pub fn retry_with_backoff<T, F>(config: &RetryConfig, mut operation: F) -> StoreResult<T>
where
    F: FnMut() -> StoreResult<T>,
{
    let mut delay_ms = config.initial_delay_ms;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation() {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.kind.is_transient() || attempt >= config.max_attempts {
                    return Err(err);
                }
                debug!(attempt, delay_ms, %err, "transient store error, retrying");
                std::thread::sleep(Duration::from_millis(delay_ms));
                delay_ms = delay_ms.saturating_mul(2).min(config.max_delay_ms);
            }
        }
    }
}
