//! Bounded retry with backoff for blocking operations
//!
//! The executor runs an operation up to `max_attempts` times. After each
//! failure a [`RetryPolicy`] decides whether another attempt is worthwhile;
//! if so the executor waits for the backoff delay on its [`Clock`] and tries
//! again. When attempts run out, or the policy says stop, the operation's own
//! last error is returned unchanged.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::time::Clock;

/// Errors raised while configuring a retry executor
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError {
    /// The retry strategy configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Outcome of a retry execution including summary statistics
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    /// Attempts performed, including the first one
    pub attempts: u32,
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide what to do after failed attempt `attempt` (1-based)
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

impl<E, F> RetryPolicy<E> for F
where
    F: Fn(&E, u32) -> RetryDecision,
{
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
        self(error, attempt)
    }
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// `initial_delay + increment × n` after failed attempt `n`
    Linear { initial_delay: Duration, increment: Duration },
}

impl BackoffStrategy {
    /// Linear backoff with no offset: `base × n`
    #[must_use]
    pub const fn linear(base: Duration) -> Self {
        Self::Linear { initial_delay: Duration::ZERO, increment: base }
    }

    /// Delay to wait after failed attempt `attempt` (1-based)
    #[must_use]
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Linear { initial_delay, increment } => {
                initial_delay.saturating_add(increment.saturating_mul(attempt))
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, backoff: BackoffStrategy::linear(Duration::from_millis(100)) }
    }
}

impl RetryConfig {
    /// Linear-backoff configuration
    #[must_use]
    pub const fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts, backoff: BackoffStrategy::linear(base_delay) }
    }

    /// Check the configuration can run at least one attempt
    ///
    /// # Errors
    /// Returns [`RetryError::InvalidConfiguration`] when `max_attempts` is zero.
    pub fn validate(&self) -> Result<(), RetryError> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// The main retry executor
pub struct RetryExecutor<P, C> {
    config: RetryConfig,
    policy: P,
    clock: C,
}

impl<P, C: Clock> RetryExecutor<P, C> {
    /// Create an executor
    ///
    /// # Errors
    /// Fails when the configuration does not validate.
    pub fn new(config: RetryConfig, policy: P, clock: C) -> Result<Self, RetryError> {
        config.validate()?;
        Ok(Self { config, policy, clock })
    }

    /// Configuration in use
    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    pub fn execute<F, T, E>(&self, operation: F) -> Result<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        self.execute_with_outcome(operation).into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics
    ///
    /// The operation receives the 1-based attempt number.
    pub fn execute_with_outcome<F, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut total_delay = Duration::ZERO;
        let mut attempt = 1;

        loop {
            debug!(attempt, max_attempts, "executing operation");

            let error = match operation(attempt) {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "operation succeeded after retry");
                    }
                    return RetryOutcome { result: Ok(value), attempts: attempt, total_delay };
                }
                Err(error) => error,
            };

            if attempt >= max_attempts {
                warn!(attempts = attempt, error = %error, "all retry attempts exhausted");
                return RetryOutcome { result: Err(error), attempts: attempt, total_delay };
            }

            if self.policy.should_retry(&error, attempt) == RetryDecision::Stop {
                debug!(attempt, error = %error, "error is not retryable");
                return RetryOutcome { result: Err(error), attempts: attempt, total_delay };
            }

            let delay = self.config.backoff.calculate_delay(attempt);
            warn!(attempt, ?delay, error = %error, "operation failed, retrying");
            self.clock.sleep(delay);
            total_delay += delay;
            attempt += 1;
        }
    }
}
