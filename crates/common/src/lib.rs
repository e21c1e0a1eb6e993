//! Shared utilities for the Tourist eSIM client crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: time abstractions
//! - `runtime`: resilience primitives (blocking retry executor)
//! - `test-utils`: `MockClock` for deterministic tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod time;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use resilience::{BackoffStrategy, RetryConfig, RetryDecision, RetryExecutor, RetryPolicy};
#[cfg(feature = "foundation")]
pub use time::{Clock, SystemClock};
