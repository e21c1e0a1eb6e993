//! Access token value object
//!
//! A [`Token`] is built once (from a grant response or a cache entry) and never
//! mutated. Expiry is computed against a caller-supplied instant so the same
//! logic serves both the system clock and simulated clocks in tests.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TOKEN_LIFETIME_SECS, DEFAULT_TOKEN_TYPE, EXPIRY_SAFETY_MARGIN_SECS};
use crate::errors::{EsimError, Result};
use crate::secret::Secret;

/// OAuth2 bearer token with its issue time and lifetime
///
/// Serialized form is the cache entry layout:
/// `{access_token, token_type, expires_in, created_at}` with `created_at` in
/// unix seconds. Entries with a blank access token do not decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TokenEntry")]
pub struct Token {
    access_token: Secret,
    token_type: String,
    expires_in: u64,
    #[serde(with = "chrono::serde::ts_seconds")]
    created_at: DateTime<Utc>,
}

/// Cache entry as read from disk, before validation
#[derive(Deserialize)]
struct TokenEntry {
    access_token: Secret,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default = "default_lifetime")]
    expires_in: u64,
    #[serde(with = "chrono::serde::ts_seconds")]
    created_at: DateTime<Utc>,
}

impl TryFrom<TokenEntry> for Token {
    type Error = String;

    fn try_from(entry: TokenEntry) -> std::result::Result<Self, Self::Error> {
        if entry.access_token.expose().trim().is_empty() {
            return Err("access_token must not be empty".to_string());
        }
        Ok(Self::new(entry.access_token, entry.expires_in, entry.token_type, entry.created_at))
    }
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

const fn default_lifetime() -> u64 {
    DEFAULT_TOKEN_LIFETIME_SECS
}

impl Token {
    /// Create a token issued at `issued_at`
    ///
    /// A blank `token_type` falls back to `Bearer`.
    pub fn new(
        access_token: impl Into<Secret>,
        lifetime_secs: u64,
        token_type: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let token_type = token_type.into();
        let token_type =
            if token_type.trim().is_empty() { default_token_type() } else { token_type };

        Self { access_token: access_token.into(), token_type, expires_in: lifetime_secs, created_at: issued_at }
    }

    /// Create a `Bearer` token issued now
    pub fn bearer(access_token: impl Into<Secret>, lifetime_secs: u64) -> Self {
        Self::new(access_token, lifetime_secs, DEFAULT_TOKEN_TYPE, Utc::now())
    }

    /// The secret token value
    #[must_use]
    pub fn access_token(&self) -> &Secret {
        &self.access_token
    }

    /// Token type, normally `Bearer`
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Nominal lifetime in seconds
    #[must_use]
    pub const fn lifetime_secs(&self) -> u64 {
        self.expires_in
    }

    /// Instant the token was issued
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Instant the server stops accepting the token
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        let lifetime = i64::try_from(self.expires_in).unwrap_or(i64::MAX);
        self.created_at
            .checked_add_signed(Duration::seconds(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// True when `now + 60s >= expires_at`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let margin = Duration::seconds(EXPIRY_SAFETY_MARGIN_SECS);
        now.checked_add_signed(margin).map_or(true, |edge| edge >= self.expires_at())
    }

    /// Expiry check against the system clock
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whole seconds until `expires_at`, never negative
    #[must_use]
    pub fn time_remaining_at(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((self.expires_at() - now).num_seconds()).unwrap_or(0)
    }

    /// Seconds remaining against the system clock
    #[must_use]
    pub fn time_remaining(&self) -> u64 {
        self.time_remaining_at(Utc::now())
    }

    /// Value for the `Authorization` header: `"{type} {token}"`
    #[must_use]
    pub fn authorization_header_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.expose())
    }

    /// Encode as a cache entry
    ///
    /// # Errors
    /// Only fails if JSON encoding fails, which does not happen for this shape.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a cache entry; entries without `created_at` or with a blank
    /// access token are rejected
    ///
    /// # Errors
    /// Returns the parse error for malformed or incomplete entries.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Body of a successful client-credentials grant
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    /// Missing or empty means the grant failed
    #[serde(default)]
    pub access_token: Option<String>,
    /// Lifetime in seconds, defaults to 3600
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Defaults to `Bearer`
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Build the token this grant describes, issued at `now`
    ///
    /// # Errors
    /// `Authentication` when the access token is missing or blank, or when the
    /// granted lifetime is already inside the expiry safety margin.
    pub fn into_token(self, now: DateTime<Utc>) -> Result<Token> {
        let access_token = match self.access_token {
            Some(value) if !value.trim().is_empty() => value,
            _ => return Err(EsimError::invalid_credentials()),
        };

        let lifetime = self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let token = Token::new(access_token, lifetime, self.token_type.unwrap_or_default(), now);

        if token.is_expired_at(now) {
            return Err(EsimError::Authentication {
                message: format!(
                    "Token endpoint granted a lifetime of {lifetime}s, too short to be used"
                ),
                status: None,
                raw_body: None,
                request_id: None,
            });
        }

        Ok(token)
    }
}
