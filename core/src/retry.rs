//! Bounded retry for transient isolation conflicts.
//!
//! Only [`LedgerError::Conflict`] is retried. Business-rule rejections
//! (`InsufficientCapacity`, `AlreadyCancelled`) and validation errors are
//! returned on the first attempt.
//!
//! # Example
//!
//! ```ignore
//! use seatbook_core::retry::{retry_on_conflict, RetryPolicy};
//!
//! let policy = RetryPolicy::new().with_max_attempts(3);
//! let booking = retry_on_conflict(&policy, "debit", || store.try_debit(event_id, 2, user_id)).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::error::{LedgerError, Result};

/// Retry policy for ledger transactions.
///
/// Exponential backoff with jitter, capped by `max_delay`. The defaults are
/// tuned for short row-lock transactions rather than remote services.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt)
    max_attempts: u32,

    /// Delay before the first retry
    initial_delay: Duration,

    /// Maximum delay between retries (caps exponential backoff)
    max_delay: Duration,

    /// Multiplier for exponential backoff (2.0 = double each time)
    backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Create a new retry policy with default settings
    ///
    /// Defaults:
    /// - `max_attempts`: 3
    /// - `initial_delay`: 20 milliseconds
    /// - `max_delay`: 200 milliseconds
    /// - `backoff_multiplier`: 2.0 (exponential)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(200),
            backoff_multiplier: 2.0,
        }
    }

    /// Set maximum attempts. Values below one are treated as one.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = if attempts == 0 { 1 } else { attempts };
        self
    }

    /// Set initial delay before first retry
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay between retries
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set backoff multiplier for exponential backoff
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculate delay after a failed attempt (0-indexed)
    ///
    /// `delay = min(initial_delay * multiplier^attempt, max_delay) * random(0.5..=1.0)`
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        use rand::Rng;

        #[allow(clippy::cast_possible_wrap)]
        let base_delay_secs =
            self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);

        let capped_secs = base_delay_secs.min(self.max_delay.as_secs_f64());

        let jitter = rand::thread_rng().gen_range(0.5..=1.0);
        Duration::from_secs_f64(capped_secs * jitter)
    }

    /// Get maximum number of attempts
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Check if another attempt is allowed after `attempt` attempts have run
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `operation` until it succeeds, fails with a non-transient error, or
/// the policy is exhausted.
///
/// Each attempt must be a complete transaction: the closure is called again
/// from scratch, so nothing from a failed attempt is reused.
///
/// # Errors
///
/// Returns the first non-transient error, or the last [`LedgerError::Conflict`]
/// once `max_attempts` attempts have failed.
pub async fn retry_on_conflict<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &'static str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Err(LedgerError::Conflict(reason)) if policy.should_retry(attempt) => {
                let delay = policy.delay_for_attempt(attempt - 1);
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = policy.max_attempts(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    reason = %reason,
                    "Transient conflict, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(LedgerError::Conflict(reason)) => {
                tracing::error!(
                    operation = operation_name,
                    attempts = attempt,
                    reason = %reason,
                    "Conflict persisted after all retries"
                );
                return Err(LedgerError::Conflict(reason));
            }
            other => return other,
        }
    }
}
