//! Client facade
//!
//! [`EsimClient`] wires configuration, HTTP transport, token store, token
//! provider and request executor together in one place. Resource wrappers
//! build on its verb methods.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tourist_esim_common::time::{Clock, SystemClock};
use tourist_esim_core::{TokenProvider, TokenStore};
use tourist_esim_domain::constants::SDK_VERSION;
use tourist_esim_domain::{ClientConfig, ResponseBody, Result, Token};
use tracing::info;

use crate::auth::OAuthTokenClient;
use crate::cache::{FileTokenStore, MemoryTokenStore};
use crate::config::loader;
use crate::http::{HttpClient, RequestExecutor};

/// Authenticated client for the Tourist eSIM partner API
pub struct EsimClient {
    config: ClientConfig,
    store: Arc<dyn TokenStore>,
    tokens: Arc<TokenProvider>,
    executor: RequestExecutor,
}

impl EsimClient {
    /// SDK version
    pub const VERSION: &'static str = SDK_VERSION;

    /// Build a client using the system clock and the configured token cache
    ///
    /// # Errors
    /// `Configuration` when the settings are invalid or the HTTP client cannot
    /// be created.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let store: Arc<dyn TokenStore> = if config.cache.enabled {
            Arc::new(FileTokenStore::new(config.cache.resolved_dir()))
        } else {
            Arc::new(MemoryTokenStore::new())
        };
        Self::with_parts(config, store, Arc::new(SystemClock))
    }

    /// Build a client from environment variables or a config file
    ///
    /// # Errors
    /// See [`loader::load`] and [`EsimClient::new`].
    pub fn from_env() -> Result<Self> {
        Self::new(loader::load()?)
    }

    /// Build a client with an explicit token store and clock
    ///
    /// # Errors
    /// Same as [`EsimClient::new`].
    pub fn with_parts(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let http = HttpClient::from_config(&config)?;
        let issuer = Arc::new(OAuthTokenClient::from_config(http.clone(), &config));
        let tokens = Arc::new(TokenProvider::new(
            config.credentials.clone(),
            issuer,
            Arc::clone(&store),
            Arc::clone(&clock),
        ));
        let executor = RequestExecutor::new(&config, http, tokens.clone(), clock)?;

        info!(
            base_url = %config.base_url,
            mode = %config.mode,
            max_attempts = config.max_attempts,
            "tourist eSIM client ready"
        );

        Ok(Self { config, store, tokens, executor })
    }

    /// Settings in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn get(&self, path: &str, query: Option<&Value>) -> Result<ResponseBody> {
        self.executor.get(path, query)
    }

    pub fn post(&self, path: &str, body: &Value) -> Result<ResponseBody> {
        self.executor.post(path, body)
    }

    pub fn put(&self, path: &str, body: &Value) -> Result<ResponseBody> {
        self.executor.put(path, body)
    }

    pub fn delete(&self, path: &str) -> Result<ResponseBody> {
        self.executor.delete(path)
    }

    /// Arbitrary verb; see [`RequestExecutor::execute`]
    pub fn execute(&self, method: Method, path: &str, payload: Option<&Value>) -> Result<ResponseBody> {
        self.executor.execute(method, path, payload)
    }

    /// Current bearer token string, refreshed if needed
    pub fn access_token(&self) -> Result<String> {
        self.tokens.access_token()
    }

    /// Current token with its metadata, refreshed if needed
    pub fn valid_token(&self) -> Result<Token> {
        self.tokens.get_valid_token()
    }

    /// Revoke the current token; local copies are cleared in every case
    pub fn revoke_token(&self) -> bool {
        self.tokens.revoke_token()
    }

    /// Remove every cached token this library wrote to the store
    pub fn flush_token_cache(&self) {
        self.store.flush();
    }
}
