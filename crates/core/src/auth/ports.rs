//! Port interfaces for token handling
//!
//! These traits define the boundaries between the token lifecycle logic and
//! the infrastructure that persists tokens or talks to the OAuth endpoints.

use tourist_esim_domain::{Credentials, Result, Token, TokenResponse};

/// Durable token cache keyed by credential identity
///
/// Implementations are best-effort: every failure is recovered locally and
/// reported as "absent" or ignored. Caching is an optimization, not a
/// correctness requirement.
pub trait TokenStore: Send + Sync {
    /// Cached token for `key`, or `None` when missing or unreadable
    fn get(&self, key: &str) -> Option<Token>;

    /// Persist `token` under `key`
    fn store(&self, key: &str, token: &Token);

    /// Remove the entry for `key`
    fn forget(&self, key: &str);

    /// Remove every entry this library created
    fn flush(&self);
}

/// Client for the OAuth2 authorization endpoints
pub trait TokenIssuer: Send + Sync {
    /// Perform a client-credentials grant
    ///
    /// # Errors
    /// `Authentication` on 401, `Connection` for transport failures and other
    /// error statuses.
    fn request_token(&self, credentials: &Credentials) -> Result<TokenResponse>;

    /// Revoke a previously issued token
    ///
    /// # Errors
    /// Any failure of the revocation call.
    fn revoke_token(&self, token: &Token) -> Result<()>;
}

/// Source of bearer tokens for authenticated requests
pub trait AccessTokenProvider: Send + Sync {
    /// A token that is not expired at the time of the call
    ///
    /// # Errors
    /// `Authentication` or `Connection` when a new token cannot be acquired.
    fn valid_token(&self) -> Result<Token>;
}
