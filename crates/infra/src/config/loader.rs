//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the credentials are not set there, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `TOURIST_ESIM_CLIENT_ID`: OAuth client id (required)
//! - `TOURIST_ESIM_CLIENT_SECRET`: OAuth client secret (required)
//! - `TOURIST_ESIM_BASE_URL`: Resource API base URL
//! - `TOURIST_ESIM_AUTH_URL`: Host serving `/oauth/token` and `/oauth/revoke`
//! - `TOURIST_ESIM_MODE`: `sandbox` or `production`
//! - `TOURIST_ESIM_TIMEOUT`: Request timeout in seconds
//! - `TOURIST_ESIM_CONNECT_TIMEOUT`: Connect timeout in seconds
//! - `TOURIST_ESIM_VERIFY_SSL`: Verify TLS certificates (true/false)
//! - `TOURIST_ESIM_USE_SYSTEM_PROXY`: Honour proxy environment variables (true/false)
//! - `TOURIST_ESIM_USER_AGENT`: User agent override
//! - `TOURIST_ESIM_MAX_RETRIES`: Total attempts per request
//! - `TOURIST_ESIM_RETRY_DELAY_MS`: Linear backoff unit in milliseconds
//! - `TOURIST_ESIM_CACHE_DIR`: Directory for cached tokens
//! - `TOURIST_ESIM_CACHE_ENABLED`: Persist tokens to disk (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./tourist-esim.json` or `./tourist-esim.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tourist_esim_domain::{ClientConfig, EsimError, Mode, Result};

use crate::errors::InfraError;

/// On-disk and environment representation of [`ClientConfig`]
///
/// Only the credentials are required; every other field falls back to the
/// documented default.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: Option<String>,
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub revoke_url: Option<String>,
    pub mode: Option<String>,
    /// Seconds
    pub timeout: Option<u64>,
    /// Seconds
    pub connect_timeout: Option<u64>,
    pub verify_ssl: Option<bool>,
    pub use_system_proxy: Option<bool>,
    pub user_agent: Option<String>,
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub cache_enabled: Option<bool>,
    pub cache_dir: Option<PathBuf>,
}

impl ConfigFile {
    /// Apply defaults and validate
    ///
    /// # Errors
    /// `Configuration` for an unknown mode or settings rejected by
    /// [`ClientConfig::validate`].
    pub fn into_client_config(self) -> Result<ClientConfig> {
        let mut builder = ClientConfig::builder(self.client_id, self.client_secret);

        if let Some(url) = self.base_url {
            builder = builder.base_url(url);
        }
        if let Some(url) = self.auth_url {
            builder = builder.auth_base_url(url);
        }
        if let Some(url) = self.token_url {
            builder = builder.token_url(url);
        }
        if let Some(url) = self.revoke_url {
            builder = builder.revoke_url(url);
        }
        if let Some(mode) = self.mode {
            builder = builder.mode(mode.parse::<Mode>().map_err(EsimError::Configuration)?);
        }
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.connect_timeout {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(verify) = self.verify_ssl {
            builder = builder.verify_ssl(verify);
        }
        if let Some(enabled) = self.use_system_proxy {
            builder = builder.use_system_proxy(enabled);
        }
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(attempts) = self.max_retries {
            builder = builder.max_attempts(attempts);
        }
        if let Some(ms) = self.retry_delay_ms {
            builder = builder.retry_base_delay(Duration::from_millis(ms));
        }
        if let Some(enabled) = self.cache_enabled {
            builder = builder.cache_enabled(enabled);
        }
        if let Some(dir) = self.cache_dir {
            builder = builder.cache_dir(dir);
        }

        builder.build()
    }
}

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the credentials
/// are missing there, falls back to loading from a config file.
///
/// # Errors
/// Returns `EsimError::Configuration` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `EsimError::Configuration` if the credentials are missing or a
/// variable has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let file = ConfigFile {
        client_id: env_var("TOURIST_ESIM_CLIENT_ID")?,
        client_secret: env_var("TOURIST_ESIM_CLIENT_SECRET")?,
        base_url: env_opt("TOURIST_ESIM_BASE_URL"),
        auth_url: env_opt("TOURIST_ESIM_AUTH_URL"),
        token_url: None,
        revoke_url: None,
        mode: env_opt("TOURIST_ESIM_MODE"),
        timeout: env_parse("TOURIST_ESIM_TIMEOUT")?,
        connect_timeout: env_parse("TOURIST_ESIM_CONNECT_TIMEOUT")?,
        verify_ssl: env_opt("TOURIST_ESIM_VERIFY_SSL").map(|_| env_bool("TOURIST_ESIM_VERIFY_SSL", true)),
        use_system_proxy: env_opt("TOURIST_ESIM_USE_SYSTEM_PROXY")
            .map(|_| env_bool("TOURIST_ESIM_USE_SYSTEM_PROXY", true)),
        user_agent: env_opt("TOURIST_ESIM_USER_AGENT"),
        max_retries: env_parse("TOURIST_ESIM_MAX_RETRIES")?,
        retry_delay_ms: env_parse("TOURIST_ESIM_RETRY_DELAY_MS")?,
        cache_enabled: env_opt("TOURIST_ESIM_CACHE_ENABLED")
            .map(|_| env_bool("TOURIST_ESIM_CACHE_ENABLED", true)),
        cache_dir: env_opt("TOURIST_ESIM_CACHE_DIR").map(PathBuf::from),
    };

    file.into_client_config()
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `EsimError::Configuration` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(EsimError::Configuration(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            EsimError::Configuration(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(InfraError::from)?;

    parse_config(&contents, &config_path)?.into_client_config()
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ConfigFile> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let parsed: ConfigFile = match extension {
        "toml" => toml::from_str(contents).map_err(InfraError::from)?,
        "json" => serde_json::from_str(contents).map_err(InfraError::from)?,
        _ => {
            return Err(EsimError::Configuration(format!(
                "Unsupported config format: {extension}"
            )))
        }
    };
    Ok(parsed)
}

/// Probe multiple paths for configuration files
///
/// Searches `tourist-esim.{json,toml}` then `config.{json,toml}` in the
/// current working directory, then next to the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["tourist-esim.json", "tourist-esim.toml", "config.json", "config.toml"];

    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    dirs.iter().flat_map(|dir| NAMES.iter().map(move |name| dir.join(name))).find(|p| p.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `EsimError::Configuration` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        EsimError::Configuration(format!("Missing required environment variable: {key}"))
    })
}

/// Optional, non-empty environment variable
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an optional numeric environment variable
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| EsimError::Configuration(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
