//! Authenticated request pipeline
//!
//! [`RequestExecutor`] turns a verb, path and optional JSON payload into one
//! decoded response body or one classified error. A bearer token is fetched
//! once per call, then the request is sent up to `max_attempts` times with
//! linear backoff. Only connect failures and 5xx responses are retried.

use std::fmt;
use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::Value;
use tourist_esim_common::resilience::{RetryConfig, RetryDecision, RetryExecutor};
use tourist_esim_common::time::Clock;
use tourist_esim_core::{classify, is_retryable_status, AccessTokenProvider};
use tourist_esim_domain::{ClientConfig, EsimError, ResponseBody, Result};
use tracing::{debug, instrument, warn};

use super::client::{should_retry_error, HttpClient};
use crate::errors::InfraError;

/// Failed attempt plus whether another attempt may help
#[derive(Debug)]
struct AttemptFailure {
    error: EsimError,
    retryable: bool,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

type AttemptPolicy = fn(&AttemptFailure, u32) -> RetryDecision;

fn retry_transient(failure: &AttemptFailure, _attempt: u32) -> RetryDecision {
    if failure.retryable {
        RetryDecision::Retry
    } else {
        RetryDecision::Stop
    }
}

/// Executes authenticated API calls with retry
pub struct RequestExecutor {
    base_url: String,
    http: HttpClient,
    tokens: Arc<dyn AccessTokenProvider>,
    retry: RetryExecutor<AttemptPolicy, Arc<dyn Clock>>,
}

impl RequestExecutor {
    /// Create an executor
    ///
    /// # Errors
    /// `Configuration` when the retry settings are unusable.
    pub fn new(
        config: &ClientConfig,
        http: HttpClient,
        tokens: Arc<dyn AccessTokenProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let retry_config = RetryConfig::linear(config.max_attempts, config.retry_base_delay);
        let retry = RetryExecutor::new(retry_config, retry_transient as AttemptPolicy, clock)
            .map_err(|e| EsimError::Configuration(e.to_string()))?;

        Ok(Self { base_url: config.base_url.trim_end_matches('/').to_string(), http, tokens, retry })
    }

    /// `GET {base}/{path}` with `query` object fields as query parameters
    pub fn get(&self, path: &str, query: Option<&Value>) -> Result<ResponseBody> {
        self.execute(Method::GET, path, query)
    }

    /// `POST {base}/{path}` with a JSON body
    pub fn post(&self, path: &str, body: &Value) -> Result<ResponseBody> {
        self.execute(Method::POST, path, Some(body))
    }

    /// `PUT {base}/{path}` with a JSON body
    pub fn put(&self, path: &str, body: &Value) -> Result<ResponseBody> {
        self.execute(Method::PUT, path, Some(body))
    }

    /// `DELETE {base}/{path}`
    pub fn delete(&self, path: &str) -> Result<ResponseBody> {
        self.execute(Method::DELETE, path, None)
    }

    /// Perform one authenticated call
    ///
    /// For `GET` and `DELETE` the payload's top-level fields become query
    /// parameters; for every other method it is sent as the JSON body.
    ///
    /// # Errors
    /// `Configuration` when a `GET`/`DELETE` payload is neither an object nor
    /// `null`; otherwise the classified error of the last attempt, or the
    /// token acquisition failure.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub fn execute(&self, method: Method, path: &str, payload: Option<&Value>) -> Result<ResponseBody> {
        let sends_query = method == Method::GET || method == Method::DELETE;
        if sends_query {
            if let Some(payload) = payload.filter(|p| !p.is_object() && !p.is_null()) {
                return Err(EsimError::Configuration(format!(
                    "{method} parameters must be a JSON object, got {}",
                    json_type(payload)
                )));
            }
        }

        let token = self.tokens.valid_token()?;
        let authorization = token.authorization_header_value();
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let outcome = self.retry.execute_with_outcome(|attempt| {
            let mut request =
                self.http.request(method.clone(), &url).header(AUTHORIZATION, authorization.as_str());

            match payload {
                Some(payload) if sends_query => request = request.query(&query_pairs(payload)),
                Some(payload) => request = request.json(payload),
                None => {}
            }

            debug!(attempt, "sending API request");
            self.attempt(request)
        });

        if outcome.attempts > 1 {
            debug!(attempts = outcome.attempts, "request finished after retries");
        }

        outcome.into_result().map_err(|failure| {
            warn!(kind = %failure.error.kind(), status = ?failure.error.status(), "API request failed");
            failure.error
        })
    }

    fn attempt(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> std::result::Result<ResponseBody, AttemptFailure> {
        match self.http.send(request) {
            Ok(reply) if reply.is_success() => Ok(ResponseBody::parse(&reply.body)),
            Ok(reply) => Err(AttemptFailure {
                retryable: is_retryable_status(reply.status),
                error: classify(reply.status, &reply.body, reply.meta),
            }),
            Err(err) => Err(AttemptFailure {
                retryable: should_retry_error(&err),
                error: EsimError::from(InfraError::from(err)),
            }),
        }
    }
}

/// Flatten a JSON object into query pairs
///
/// Scalars are rendered as text, `null` is skipped, arrays repeat the key as
/// `key[]`, nested objects are sent as their JSON text.
fn query_pairs(payload: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = payload else {
        return Vec::new();
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                let key = format!("{key}[]");
                pairs.extend(items.iter().filter_map(scalar_text).map(|v| (key.clone(), v)));
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        other => Some(other.to_string()),
    }
}
