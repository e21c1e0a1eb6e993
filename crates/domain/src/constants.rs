//! SDK constants
//!
//! Defaults shared by configuration, token handling and the request pipeline.

/// SDK version reported in the default user agent
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

// Endpoints
pub const DEFAULT_BASE_URL: &str = "https://api.touristesim.net/v1";
pub const DEFAULT_AUTH_BASE_URL: &str = "https://api.touristesim.net";
pub const TOKEN_PATH: &str = "/oauth/token";
pub const REVOKE_PATH: &str = "/oauth/revoke";

// Transport
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;
pub const USER_AGENT_PREFIX: &str = "TouristeSIM-SDK-Rust";
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

// Tokens
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 60;
pub const TOKEN_CACHE_PREFIX: &str = "tourist_esim_token_";
pub const TOKEN_CACHE_EXTENSION: &str = "json";

// Response decoding
pub const RAW_RESPONSE_KEY: &str = "raw_response";
