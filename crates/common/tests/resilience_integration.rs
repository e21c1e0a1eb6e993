//! Integration tests for resilience module
//!
//! Drives the blocking retry executor through the public API with a
//! recording clock, so backoff is observed without real waits.

#![cfg(feature = "runtime")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tourist_esim_common::resilience::{RetryConfig, RetryDecision, RetryError, RetryExecutor};
use tourist_esim_common::Clock;

/// Custom error type for testing
#[derive(Debug, Clone, PartialEq, Eq)]
struct TestError {
    message: String,
    retryable: bool,
}

impl TestError {
    fn transient(message: &str) -> Self {
        Self { message: message.to_string(), retryable: true }
    }

    fn permanent(message: &str) -> Self {
        Self { message: message.to_string(), retryable: false }
    }
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Clock that records sleeps instead of blocking
#[derive(Clone, Default)]
struct RecordingClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClock {
    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for RecordingClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

fn by_flag(error: &TestError, _attempt: u32) -> RetryDecision {
    if error.retryable {
        RetryDecision::Retry
    } else {
        RetryDecision::Stop
    }
}

/// Validates recovery from transient failures with linear backoff.
///
/// # Test Steps
/// 1. Configure 5 attempts with a 10ms linear step
/// 2. Fail the first 3 attempts with a transient error
/// 3. Verify the 4th attempt's value is returned
/// 4. Confirm the sleeps were 10ms, 20ms and 30ms
#[test]
fn test_retry_linear_backoff_success() {
    let clock = RecordingClock::default();
    let executor = RetryExecutor::new(
        RetryConfig::linear(5, Duration::from_millis(10)),
        by_flag,
        clock.clone(),
    )
    .expect("valid config");

    let calls = AtomicU32::new(0);
    let outcome = executor.execute_with_outcome(|attempt| {
        calls.fetch_add(1, Ordering::SeqCst);
        if attempt < 4 {
            Err(TestError::transient("connection reset"))
        } else {
            Ok(attempt)
        }
    });

    assert_eq!(outcome.attempts, 4);
    assert_eq!(outcome.total_delay, Duration::from_millis(60));
    assert_eq!(outcome.into_result(), Ok(4));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_millis(10), Duration::from_millis(20), Duration::from_millis(30)]
    );
}

/// Validates that the last error is surfaced unchanged once attempts run out.
#[test]
fn test_retry_exhaustion_returns_last_error() {
    let clock = RecordingClock::default();
    let executor =
        RetryExecutor::new(RetryConfig::default(), by_flag, clock.clone()).expect("valid config");

    let result: Result<(), TestError> =
        executor.execute(|attempt| Err(TestError::transient(&format!("failure #{attempt}"))));

    assert_eq!(result, Err(TestError::transient("failure #3")));
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(100), Duration::from_millis(200)]);
}

/// Validates that a policy stop ends the loop immediately.
#[test]
fn test_non_retryable_error_stops_immediately() {
    let clock = RecordingClock::default();
    let executor =
        RetryExecutor::new(RetryConfig::default(), by_flag, clock.clone()).expect("valid config");

    let outcome =
        executor.execute_with_outcome(|_| Err::<(), _>(TestError::permanent("bad request")));

    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.total_delay, Duration::ZERO);
    assert!(clock.sleeps().is_empty());
}

/// Validates that a policy can bound retries by attempt number.
#[test]
fn test_policy_sees_attempt_number() {
    let clock = RecordingClock::default();
    let policy = |_: &TestError, attempt: u32| {
        if attempt < 2 {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    };
    let executor = RetryExecutor::new(RetryConfig::linear(10, Duration::from_millis(5)), policy, clock)
        .expect("valid config");

    let outcome = executor.execute_with_outcome(|_| Err::<(), _>(TestError::transient("flaky")));

    assert_eq!(outcome.attempts, 2);
}

/// Validates that a zero attempt budget is rejected up front.
#[test]
fn test_zero_attempts_is_invalid() {
    let result = RetryExecutor::new(
        RetryConfig::linear(0, Duration::from_millis(5)),
        by_flag,
        RecordingClock::default(),
    );

    assert!(matches!(result, Err(RetryError::InvalidConfiguration { .. })));
}
