//! Time utilities and abstractions
//!
//! - **Clock abstractions**: real and mock time, see [`clock`]

pub mod clock;

#[cfg(any(test, feature = "test-utils"))]
pub use clock::MockClock;
pub use clock::{Clock, SystemClock};
