//! Wall-clock abstraction
//!
//! Token expiry and retry backoff both depend on time. Code that needs the
//! current instant or has to wait takes a [`Clock`], so tests can swap in
//! [`MockClock`] and move time forward without sleeping.
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "test-utils")]
//! # {
//! use std::time::Duration;
//!
//! use tourist_esim_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!((clock.now() - start).num_seconds(), 5);
//! # }
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Source of the current time and of blocking waits
pub trait Clock: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockClock;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{DateTime, Utc};
    use parking_lot::Mutex;

    use super::Clock;

    /// Clock for deterministic tests
    ///
    /// Clones share the same timeline. `sleep` returns immediately after
    /// advancing the clock and recording the requested duration.
    #[derive(Debug, Clone)]
    pub struct MockClock {
        current: Arc<Mutex<DateTime<Utc>>>,
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    impl MockClock {
        /// Mock clock starting at the current real time
        #[must_use]
        pub fn new() -> Self {
            Self::starting_at(Utc::now())
        }

        /// Mock clock starting at `start`
        #[must_use]
        pub fn starting_at(start: DateTime<Utc>) -> Self {
            Self {
                current: Arc::new(Mutex::new(start)),
                sleeps: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Move time forward without waiting
        pub fn advance(&self, duration: Duration) {
            let step = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX);
            let mut current = self.current.lock();
            *current = current.checked_add_signed(step).unwrap_or(DateTime::<Utc>::MAX_UTC);
        }

        /// Durations passed to `sleep`, in call order
        #[must_use]
        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().clone()
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Utc> {
            *self.current.lock()
        }

        fn sleep(&self, duration: Duration) {
            self.sleeps.lock().push(duration);
            self.advance(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_tracks_utc_now() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }

    #[test]
    fn mock_clock_advances_shared_timeline() {
        let clock = MockClock::new();
        let copy = clock.clone();
        let start = clock.now();

        copy.advance(Duration::from_secs(90));

        assert_eq!((clock.now() - start).num_seconds(), 90);
    }

    #[test]
    fn mock_sleep_records_and_advances() {
        let clock = MockClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_millis(100));
        clock.sleep(Duration::from_millis(200));

        assert_eq!(clock.sleeps(), vec![Duration::from_millis(100), Duration::from_millis(200)]);
        assert_eq!((clock.now() - start).num_milliseconds(), 300);
    }
}
