//! Client credential identity

use sha2::{Digest, Sha256};

use crate::constants::TOKEN_CACHE_PREFIX;
use crate::secret::Secret;

/// Client id and secret used for the client-credentials grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: Secret,
}

impl Credentials {
    /// Pair a client id with its secret
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }

    /// Public client id
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client secret
    #[must_use]
    pub fn client_secret(&self) -> &Secret {
        &self.client_secret
    }

    /// Stable store key for this identity: `tourist_esim_token_{sha256(client_id)}`
    ///
    /// Only the client id is hashed, so rotating the secret keeps reusing a
    /// still-valid cached token.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let digest = Sha256::digest(self.client_id.as_bytes());
        format!("{TOKEN_CACHE_PREFIX}{}", hex::encode(digest))
    }
}
