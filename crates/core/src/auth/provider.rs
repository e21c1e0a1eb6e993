//! Token lifecycle service
//!
//! [`TokenProvider`] answers "give me a valid token" using a three-tier
//! lookup: the token held in memory, then the durable store, then a fresh
//! client-credentials grant. The in-memory slot is guarded by a mutex held for
//! the whole lookup, so concurrent callers on one provider never trigger two
//! grants for the same expiry.

use std::sync::Arc;

use parking_lot::Mutex;
use tourist_esim_common::time::Clock;
use tourist_esim_domain::{Credentials, Result, Token};
use tracing::{debug, info, instrument, warn};

use super::ports::{AccessTokenProvider, TokenIssuer, TokenStore};

/// Keeps a valid access token for one set of credentials
pub struct TokenProvider {
    credentials: Credentials,
    cache_key: String,
    issuer: Arc<dyn TokenIssuer>,
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    current: Mutex<Option<Token>>,
}

impl TokenProvider {
    /// Create a provider with an empty in-memory slot
    pub fn new(
        credentials: Credentials,
        issuer: Arc<dyn TokenIssuer>,
        store: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache_key = credentials.cache_key();
        Self { credentials, cache_key, issuer, store, clock, current: Mutex::new(None) }
    }

    /// Credentials this provider authenticates with
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Store key derived from the client id
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// Return a token that is not expired, acquiring one if needed
    ///
    /// # Errors
    /// `Authentication` when the grant is rejected or returns no usable token,
    /// `Connection` when the token endpoint cannot be reached.
    #[instrument(skip(self), fields(client_id = %self.credentials.client_id()))]
    pub fn get_valid_token(&self) -> Result<Token> {
        let mut slot = self.current.lock();
        let now = self.clock.now();

        if let Some(token) = slot.as_ref() {
            if !token.is_expired_at(now) {
                return Ok(token.clone());
            }
            debug!("in-memory token expired");
        }

        if let Some(token) = self.store.get(&self.cache_key) {
            if token.is_expired_at(now) {
                debug!("cached token expired");
            } else {
                debug!(remaining_secs = token.time_remaining_at(now), "adopting cached token");
                *slot = Some(token.clone());
                return Ok(token);
            }
        }

        *slot = None;
        let token = self.issuer.request_token(&self.credentials)?.into_token(self.clock.now())?;
        info!(lifetime_secs = token.lifetime_secs(), "acquired new access token");

        self.store.store(&self.cache_key, &token);
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Bare access token string of a valid token
    ///
    /// # Errors
    /// Same as [`get_valid_token`](Self::get_valid_token).
    pub fn access_token(&self) -> Result<String> {
        Ok(self.get_valid_token()?.access_token().expose().to_string())
    }

    /// Revoke the held token and forget it
    ///
    /// Both the in-memory and the stored token are cleared whatever the
    /// revocation call returns. Returns `true` only if a token was held and
    /// the endpoint accepted the revocation.
    #[instrument(skip(self), fields(client_id = %self.credentials.client_id()))]
    pub fn revoke_token(&self) -> bool {
        let mut slot = self.current.lock();
        let held = slot.take().or_else(|| self.store.get(&self.cache_key));
        self.store.forget(&self.cache_key);

        let Some(token) = held else {
            debug!("no token held, nothing to revoke");
            return false;
        };

        match self.issuer.revoke_token(&token) {
            Ok(()) => {
                info!("access token revoked");
                true
            }
            Err(err) => {
                warn!(error = %err, "token revocation failed; local copies cleared");
                false
            }
        }
    }
}

impl AccessTokenProvider for TokenProvider {
    fn valid_token(&self) -> Result<Token> {
        self.get_valid_token()
    }
}
