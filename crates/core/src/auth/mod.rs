//! Access token lifecycle

pub mod ports;
pub mod provider;

pub use ports::{AccessTokenProvider, TokenIssuer, TokenStore};
pub use provider::TokenProvider;
