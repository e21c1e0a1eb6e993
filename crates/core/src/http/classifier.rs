//! Response classification
//!
//! Pure mapping from an HTTP outcome to one [`EsimError`]. Network code
//! collects the status, raw body and headers; everything about which kind of
//! failure that represents lives here.

use serde_json::Value;
use tourist_esim_domain::errors::{FieldErrors, DEFAULT_RETRY_AFTER_SECS};
use tourist_esim_domain::EsimError;

/// Headers relevant to classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// `X-Request-ID`
    pub request_id: Option<String>,
    /// `Retry-After`, in seconds
    pub retry_after: Option<u64>,
}

/// Whether a response with this status may succeed on another attempt
#[must_use]
pub const fn is_retryable_status(status: u16) -> bool {
    status >= 500
}

/// Map a non-success response to its error kind
///
/// | status | kind |
/// |---|---|
/// | 401 | `Authentication` |
/// | 404 | `NotFound` |
/// | 422 | `Validation` (field errors from `errors`) |
/// | 429 | `RateLimited` (retry-after defaults to 60s) |
/// | 503 | `ServiceUnavailable` |
/// | anything else | `Api` |
#[must_use]
pub fn classify(status: u16, raw_body: &str, meta: ResponseMeta) -> EsimError {
    let body = serde_json::from_str::<Value>(raw_body).ok().filter(|v| !v.is_null());
    let raw = (!raw_body.is_empty()).then(|| raw_body.to_string());
    let ResponseMeta { request_id, retry_after } = meta;

    match status {
        401 => EsimError::unauthorized(request_id, raw),
        404 => EsimError::NotFound {
            message: body_message(body.as_ref()).unwrap_or_else(|| "Resource not found.".to_string()),
            body,
            raw_body: raw,
            request_id,
        },
        422 => {
            let errors = field_errors(body.as_ref());
            EsimError::Validation {
                message: validation_message(&errors),
                errors,
                body,
                raw_body: raw,
                request_id,
            }
        }
        429 => EsimError::RateLimited {
            message: "Rate limit exceeded. Please try again later.".to_string(),
            retry_after: retry_after
                .or_else(|| body.as_ref().and_then(body_retry_after))
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            body,
            raw_body: raw,
            request_id,
        },
        503 => EsimError::ServiceUnavailable {
            message: "API is under maintenance. Please try again later.".to_string(),
            status,
            body,
            raw_body: raw,
            request_id,
        },
        _ => EsimError::Api {
            message: body_message(body.as_ref())
                .unwrap_or_else(|| format!("API request failed with status {status}")),
            status,
            body,
            raw_body: raw,
            request_id,
        },
    }
}

/// Map a failure that produced no response
#[must_use]
pub fn classify_transport(cause: impl std::fmt::Display) -> EsimError {
    EsimError::connection(cause.to_string())
}

fn body_message(body: Option<&Value>) -> Option<String> {
    body?.get("message")?.as_str().filter(|m| !m.is_empty()).map(str::to_string)
}

fn body_retry_after(body: &Value) -> Option<u64> {
    match body.get("retry_after")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `errors` object as field → messages; a single string counts as one message
fn field_errors(body: Option<&Value>) -> FieldErrors {
    let Some(Value::Object(map)) = body.and_then(|b| b.get("errors")) else {
        return FieldErrors::new();
    };

    map.iter()
        .map(|(field, value)| {
            let messages = match value {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => {
                    items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect()
                }
                other => vec![other.to_string()],
            };
            (field.clone(), messages)
        })
        .collect()
}

/// "Validation failed: " followed by the first field's messages
fn validation_message(errors: &FieldErrors) -> String {
    let first = errors.values().next().map(|m| m.join(", ")).unwrap_or_default();
    format!("Validation failed: {first}")
}
