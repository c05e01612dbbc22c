//! Retry with exponential backoff and jitter
//!
//! Generic over the operation; the error classification lives on
//! `DbError::is_retryable`. Backoff waits race the shutdown channel, so a
//! cancellation interrupts a sleep immediately instead of letting it run
//! out, and surfaces as `Cancelled` rather than `RetryExhausted`.

use crate::error::{DbError, DbResult};
use rand::Rng;
use spanseed_core::config::RetrySettings;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Backoff shape for one class of operations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Fraction in [0, 1): each delay is perturbed by up to this much in
    /// either direction
    pub jitter: f64,
}

impl RetryPolicy {
    /// Lightweight calls: listing tables, row counts.
    pub fn quick() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }

    /// Durable operations: mutation application.
    pub fn database() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.25,
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            multiplier: settings.multiplier,
            jitter: settings.jitter,
        }
    }

    /// Delay before the attempt after `attempt` (1-based):
    /// `initial * multiplier^(attempt-1)`, perturbed by ±jitter, capped at
    /// `max_delay`.
    fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(30) as i32;
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());
        let factor = if self.jitter > 0.0 {
            1.0 + rand::thread_rng().gen_range(-self.jitter..self.jitter)
        } else {
            1.0
        };
        Duration::from_secs_f64((capped * factor).max(0.0))
    }
}

/// Run `f` until it succeeds, fails fatally, is cancelled, or the attempt
/// budget runs out.
///
/// `cancel` is a watch channel carrying `true` once shutdown begins; pass
/// a receiver whose sender never fires to run uncancellable.
pub async fn with_retry<T, F, Fut>(
    operation: &str,
    policy: &RetryPolicy,
    cancel: watch::Receiver<bool>,
    mut f: F,
) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let mut cancel = cancel;
    let mut attempt = 1u32;

    loop {
        if *cancel.borrow() {
            return Err(DbError::Cancelled(operation.to_string()));
        }

        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt >= policy.max_attempts => {
                return Err(DbError::RetryExhausted {
                    operation: operation.to_string(),
                    attempts: attempt,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {:?}",
                    operation,
                    attempt,
                    policy.max_attempts,
                    e,
                    delay
                );
                let mut finish_sleep = false;
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    changed = cancel.wait_for(|cancelled| *cancelled) => {
                        // The borrow on the channel must end before any
                        // further await
                        let cancelled = changed.is_ok();
                        drop(changed);
                        if cancelled {
                            return Err(DbError::Cancelled(operation.to_string()));
                        }
                        // Sender gone: cancellation can no longer arrive,
                        // finish the wait plainly
                        finish_sleep = true;
                    }
                }
                if finish_sleep {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}
