//! # Tourist eSIM Infrastructure
//!
//! Network and filesystem implementations of the core ports.
//!
//! This crate contains:
//! - Blocking HTTP transport and the authenticated request pipeline
//! - OAuth token endpoint client
//! - Token stores (filesystem, in-memory)
//! - Configuration loading from env vars and files
//! - The [`EsimClient`] facade
//!
//! ## Architecture
//! - Implements traits defined in `tourist-esim-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use auth::OAuthTokenClient;
pub use cache::{FileTokenStore, MemoryTokenStore};
pub use client::EsimClient;
pub use errors::InfraError;
pub use http::{HttpClient, RequestExecutor};
