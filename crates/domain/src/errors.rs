//! Error types used throughout the SDK
//!
//! Every failed call surfaces exactly one [`EsimError`]. The variant names the
//! failure kind; its fields carry whatever HTTP context was available
//! (status, parsed body, raw body, request id) so callers can correlate a
//! failure with server-side logs.

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::impl_label_conversions;

/// Default wait suggested to the caller when a 429 response carries no hint.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

const INVALID_CREDENTIALS_MESSAGE: &str =
    "Invalid client credentials. Check your client id and client secret.";

/// Field name → messages, in the order the 422 response's `errors` object lists them.
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Exhaustive classification of SDK failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credentials rejected or token could not be obtained (401, missing token)
    Authentication,
    /// Request payload rejected by the API (422)
    Validation,
    /// Entity does not exist (404)
    NotFound,
    /// Too many requests (429)
    RateLimited,
    /// API in maintenance (503)
    ServiceUnavailable,
    /// No response received (DNS, refused, timeout)
    Connection,
    /// Any other non-success response
    Api,
    /// Invalid client settings
    Configuration,
}

impl_label_conversions!(ErrorKind {
    Authentication => "authentication_failure",
    Validation => "validation_failure",
    NotFound => "resource_not_found",
    RateLimited => "rate_limited",
    ServiceUnavailable => "service_unavailable",
    Connection => "connection_failure",
    Api => "generic_api_failure",
    Configuration => "configuration",
});

impl ErrorKind {
    /// Whether an outcome of this kind may succeed if the request is sent again.
    ///
    /// Only transport failures and 5xx-class responses qualify; retrying a
    /// validation or not-found error cannot change the answer.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Connection | Self::ServiceUnavailable)
    }
}

/// Main error type for the SDK
#[derive(Error, Debug, Clone)]
pub enum EsimError {
    #[error("{message}")]
    Authentication {
        message: String,
        status: Option<u16>,
        raw_body: Option<String>,
        request_id: Option<String>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        errors: FieldErrors,
        body: Option<Value>,
        raw_body: Option<String>,
        request_id: Option<String>,
    },

    #[error("{message}")]
    NotFound {
        message: String,
        body: Option<Value>,
        raw_body: Option<String>,
        request_id: Option<String>,
    },

    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after: u64,
        body: Option<Value>,
        raw_body: Option<String>,
        request_id: Option<String>,
    },

    #[error("{message}")]
    ServiceUnavailable {
        message: String,
        status: u16,
        body: Option<Value>,
        raw_body: Option<String>,
        request_id: Option<String>,
    },

    #[error("Connection failed: {cause}")]
    Connection { cause: String },

    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        body: Option<Value>,
        raw_body: Option<String>,
        request_id: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl EsimError {
    /// Build a connection failure from any displayable cause.
    pub fn connection(cause: impl Into<String>) -> Self {
        Self::Connection { cause: cause.into() }
    }

    /// The token grant produced no usable access token.
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::Authentication {
            message: INVALID_CREDENTIALS_MESSAGE.to_string(),
            status: None,
            raw_body: None,
            request_id: None,
        }
    }

    /// The token endpoint answered 401.
    #[must_use]
    pub fn credentials_rejected(request_id: Option<String>, raw_body: Option<String>) -> Self {
        Self::Authentication {
            message: INVALID_CREDENTIALS_MESSAGE.to_string(),
            status: Some(401),
            raw_body,
            request_id,
        }
    }

    /// A resource call was rejected with 401.
    #[must_use]
    pub fn unauthorized(request_id: Option<String>, raw_body: Option<String>) -> Self {
        Self::Authentication {
            message: "Unauthorized. Check your API credentials.".to_string(),
            status: Some(401),
            raw_body,
            request_id,
        }
    }

    /// Get the error kind for this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Api { .. } => ErrorKind::Api,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Check if this error should be retried
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// HTTP status of the response that produced this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } => *status,
            Self::Validation { .. } => Some(422),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::ServiceUnavailable { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Connection { .. } | Self::Configuration(_) => None,
        }
    }

    /// Value of the `X-Request-ID` response header, if the server sent one.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Authentication { request_id, .. }
            | Self::Validation { request_id, .. }
            | Self::NotFound { request_id, .. }
            | Self::RateLimited { request_id, .. }
            | Self::ServiceUnavailable { request_id, .. }
            | Self::Api { request_id, .. } => request_id.as_deref(),
            Self::Connection { .. } | Self::Configuration(_) => None,
        }
    }

    /// Parsed JSON response body, if the response had one.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::Validation { body, .. }
            | Self::NotFound { body, .. }
            | Self::RateLimited { body, .. }
            | Self::ServiceUnavailable { body, .. }
            | Self::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Response body text exactly as received, if the response had one.
    ///
    /// Kept for every kind built from a response, so non-JSON bodies (an HTML
    /// maintenance page, a plain-text message) stay inspectable.
    #[must_use]
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::Authentication { raw_body, .. }
            | Self::Validation { raw_body, .. }
            | Self::NotFound { raw_body, .. }
            | Self::RateLimited { raw_body, .. }
            | Self::ServiceUnavailable { raw_body, .. }
            | Self::Api { raw_body, .. } => raw_body.as_deref(),
            Self::Connection { .. } | Self::Configuration(_) => None,
        }
    }

    /// Seconds the caller should wait before retrying a rate-limited call.
    #[must_use]
    pub const fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Per-field validation messages (empty for every other kind).
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, EsimError>;
