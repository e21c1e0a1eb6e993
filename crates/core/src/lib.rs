//! # Tourist eSIM Core
//!
//! Pure logic layer - no network or filesystem code.
//!
//! This crate contains:
//! - Port interfaces (traits) for token storage and issuance
//! - The token lifecycle service
//! - Classification of HTTP outcomes into the error taxonomy
//!
//! ## Architecture Principles
//! - Only depends on `tourist-esim-common` and `tourist-esim-domain`
//! - All external effects via traits
//! - Time comes from an injected `Clock`

pub mod auth;
pub mod http;

// Re-export specific items to avoid ambiguity
pub use auth::ports::{AccessTokenProvider, TokenIssuer, TokenStore};
pub use auth::TokenProvider;
pub use http::classifier::{classify, classify_transport, is_retryable_status, ResponseMeta};
