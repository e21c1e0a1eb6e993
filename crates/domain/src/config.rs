//! Client configuration
//!
//! [`ClientConfig`] gathers every setting the request pipeline consumes. All
//! fields have documented defaults; only the credentials are required.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::constants::{
    DEFAULT_AUTH_BASE_URL, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_TIMEOUT_SECS, REVOKE_PATH, SDK_VERSION, TOKEN_PATH,
    USER_AGENT_PREFIX,
};
use crate::credentials::Credentials;
use crate::errors::{EsimError, Result};
use crate::impl_label_conversions;
use crate::secret::Secret;

/// API environment the credentials belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Sandbox,
    Production,
}

impl_label_conversions!(Mode {
    Sandbox => "sandbox",
    Production => "production",
});

/// Durable token cache settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Persist tokens to disk (otherwise they live only in memory)
    pub enabled: bool,

    /// Directory for cache files (None = OS temp dir)
    pub dir: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { enabled: true, dir: None }
    }
}

impl CacheSettings {
    /// Directory the cache files live in
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Settings for one API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    /// Resource base URL, without trailing slash
    pub base_url: String,
    /// Absolute client-credentials grant endpoint
    pub token_url: String,
    /// Absolute token revocation endpoint
    pub revoke_url: String,
    pub mode: Mode,
    /// Whole-request timeout
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub verify_ssl: bool,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment
    pub use_system_proxy: bool,
    pub user_agent: String,
    /// Total attempts per call, including the first one
    pub max_attempts: u32,
    /// Linear backoff unit: wait `base × n` after failed attempt `n`
    pub retry_base_delay: Duration,
    pub cache: CacheSettings,
}

impl ClientConfig {
    /// Start a builder for the given credentials
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<Secret>,
    ) -> ClientConfigBuilder {
        ClientConfigBuilder::new(Credentials::new(client_id, client_secret))
    }

    /// Default settings for the given credentials
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: format!("{DEFAULT_AUTH_BASE_URL}{TOKEN_PATH}"),
            revoke_url: format!("{DEFAULT_AUTH_BASE_URL}{REVOKE_PATH}"),
            mode: Mode::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            verify_ssl: true,
            use_system_proxy: true,
            user_agent: default_user_agent(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
            cache: CacheSettings::default(),
        }
    }

    /// Join the base URL and an endpoint path with exactly one `/`
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Check the settings are usable
    ///
    /// # Errors
    /// `Configuration` for blank credentials, non-http(s) URLs or a zero
    /// timeout.
    pub fn validate(&self) -> Result<()> {
        if self.credentials.client_id().trim().is_empty() {
            return Err(EsimError::Configuration("client id must not be empty".into()));
        }
        if self.credentials.client_secret().is_empty() {
            return Err(EsimError::Configuration("client secret must not be empty".into()));
        }

        for (name, value) in [
            ("base_url", &self.base_url),
            ("token_url", &self.token_url),
            ("revoke_url", &self.revoke_url),
        ] {
            validate_http_url(name, value)?;
        }

        if self.timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(EsimError::Configuration("timeouts must be greater than zero".into()));
        }

        Ok(())
    }
}

fn default_user_agent() -> String {
    format!("{USER_AGENT_PREFIX}/{SDK_VERSION}")
}

fn validate_http_url(name: &str, value: &str) -> Result<()> {
    let parsed = Url::parse(value)
        .map_err(|e| EsimError::Configuration(format!("{name} is not a valid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(EsimError::Configuration(format!(
            "{name} must use http or https, got '{other}'"
        ))),
    }
}

/// Builder for [`ClientConfig`] with fluent API
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { config: ClientConfig::new(credentials) }
    }

    /// Set the resource base URL (trailing `/` is trimmed)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Point both OAuth endpoints at `{url}/oauth/token` and `{url}/oauth/revoke`
    #[must_use]
    pub fn auth_base_url(mut self, url: impl AsRef<str>) -> Self {
        let base = url.as_ref().trim_end_matches('/');
        self.config.token_url = format!("{base}{TOKEN_PATH}");
        self.config.revoke_url = format!("{base}{REVOKE_PATH}");
        self
    }

    #[must_use]
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.config.token_url = url.into();
        self
    }

    #[must_use]
    pub fn revoke_url(mut self, url: impl Into<String>) -> Self {
        self.config.revoke_url = url.into();
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.config.verify_ssl = verify;
        self
    }

    #[must_use]
    pub fn use_system_proxy(mut self, enabled: bool) -> Self {
        self.config.use_system_proxy = enabled;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Total attempts per call (values below 1 become 1)
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.config.retry_base_delay = delay;
        self
    }

    #[must_use]
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache.enabled = enabled;
        self
    }

    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache.dir = Some(dir.into());
        self
    }

    /// Validate and return the configuration
    ///
    /// # Errors
    /// See [`ClientConfig::validate`].
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
