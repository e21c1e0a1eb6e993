//! OAuth endpoint adapters

pub mod oauth_client;

pub use oauth_client::OAuthTokenClient;
