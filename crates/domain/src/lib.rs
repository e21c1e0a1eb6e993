//! # Tourist eSIM Domain
//!
//! Core value types for the Tourist eSIM API client.
//!
//! This crate contains:
//! - `Token` and the grant response it is built from
//! - Credentials, secrets and client configuration
//! - The SDK error taxonomy and `Result` alias
//! - Decoded response bodies
//!
//! ## Architecture
//! - No dependencies on other SDK crates
//! - No I/O; every time-dependent check takes the current instant as input

pub mod config;
pub mod constants;
pub mod credentials;
pub mod errors;
pub mod macros;
pub mod response;
pub mod secret;
pub mod token;

// Re-export commonly used items
pub use config::{CacheSettings, ClientConfig, ClientConfigBuilder, Mode};
pub use credentials::Credentials;
pub use errors::*;
pub use response::ResponseBody;
pub use secret::Secret;
pub use token::{Token, TokenResponse};
