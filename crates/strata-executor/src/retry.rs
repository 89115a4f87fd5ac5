//! Bounded retry with exponential backoff and jitter.
//!
//! Composed around the executor by callers, strictly for operations marked
//! idempotent. Non-recoverable errors (plugin, configuration) return
//! immediately; circuit-open is governed by the breaker's timer, so it is
//! never retried here either.

use std::time::Duration;

use rand::Rng;
use strata_core::config::RetryConfig;
use strata_core::errors::{ExecuteError, StrataError, StrataResult};
use tracing::debug;

fn should_retry(err: &StrataError) -> bool {
    if matches!(err, StrataError::Execute(ExecuteError::CircuitOpen { .. })) {
        return false;
    }
    err.is_recoverable()
}

fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exp = config.base_delay_ms as f64 * config.multiplier.powi(attempt as i32);
    let capped = exp.min(config.max_delay_ms as f64) as u64;
    let delay_ms = if config.jitter && capped > 1 {
        // Half fixed, half jittered, so delays never collapse to zero.
        let half = capped / 2;
        half + rand::thread_rng().gen_range(0..=half)
    } else {
        capped
    };
    Duration::from_millis(delay_ms)
}

/// Run `f` up to `config.max_attempts` times. Only call this for operations
/// the caller knows are idempotent.
pub async fn retry_idempotent<T, F, Fut>(
    config: &RetryConfig,
    op_class: &str,
    mut f: F,
) -> StrataResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = StrataResult<T>>,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if !should_retry(&err) || attempt >= attempts {
                    return Err(err);
                }
                let delay = backoff_delay(config, attempt - 1);
                debug!(
                    op_class,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    %err,
                    "retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
