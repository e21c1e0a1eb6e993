//! Resilience patterns for transient failures
//!
//! - **Retry Logic**: bounded attempts with fixed or linear backoff, see
//!   [`retry`]
//!
//! The executor is generic over the error type and the [`Clock`] it sleeps
//! on, so callers keep their own error taxonomy and tests run without real
//! waits.
//!
//! [`Clock`]: crate::time::Clock

pub mod retry;

pub use retry::{
    BackoffStrategy, RetryConfig, RetryDecision, RetryError, RetryExecutor, RetryOutcome,
    RetryPolicy,
};
